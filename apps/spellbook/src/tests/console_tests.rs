use std::collections::VecDeque;

use super::*;

struct Script(VecDeque<&'static str>);

impl LineSource for Script {
    fn read_line(&mut self, _prompt: &str) -> Result<String, ConsoleError> {
        self.0
            .pop_front()
            .map(str::to_string)
            .ok_or(ConsoleError::Closed)
    }
}

fn console(lines: &[&'static str]) -> Console<Script, Vec<u8>> {
    Console::new(Script(lines.iter().copied().collect()), Vec::new())
}

fn output(console: Console<Script, Vec<u8>>) -> String {
    String::from_utf8(console.into_parts().1).expect("utf8 output")
}

#[test]
fn ask_int_reprompts_until_in_range() {
    let mut console = console(&["abc", "-1", "7", " 3 "]);
    assert_eq!(console.ask_int("> ", 0, 6).expect("answer"), 3);

    let printed = output(console);
    assert_eq!(printed.matches("Please enter an integer!").count(), 1);
    assert_eq!(printed.matches("Please enter a valid option!").count(), 2);
}

#[test]
fn ask_yes_no_accepts_any_case() {
    let mut console = console(&["maybe", "YES"]);
    assert!(console.ask_yes_no("> ").expect("answer"));
    assert!(output(console).contains("Please enter \"yes\" or \"no\""));
}

#[test]
fn exhausted_input_is_closed() {
    let mut console = console(&["x"]);
    assert!(matches!(console.ask_int("> ", 0, 1), Err(ConsoleError::Closed)));
}
