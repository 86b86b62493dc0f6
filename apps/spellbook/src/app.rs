use std::{collections::BTreeMap, io::Write};

use client_core::{
    BuildSpec, CatalogClient, ClientError, MutationOutcome, RemovalConfirmation, ShutdownReport,
    SortOutcome, SortSpec, SpellbookSession,
};
use shared::{
    domain::Spell,
    protocol::{DiceOperator, DiceRoll, SpellFields, MAX_DICE_FACES, MAX_DICE_MODIFIER},
};
use tracing::{info, warn};

use crate::{
    console::{Console, ConsoleError, LineSource},
    render::{render_spell, RULE},
};

const TITLE: &str = r"
  ____              _ _ _                 _
 / ___| _ __   ___| | | |__   ___   ___ | | __
 \___ \| '_ \ / _ \ | | '_ \ / _ \ / _ \| |/ /
  ___) | |_) |  __/ | | |_) | (_) | (_) |   <
 |____/| .__/ \___|_|_|_.__/ \___/ \___/|_|\_\
       |_|";

const HELP: &str = "Help Manual

Search the D&D 5e catalog for spells by exact name or by keyword, keep
the ones you like as bookmarks, and build your own.

Option 6: Roll a dice
Roll a die with 0 to 10000 faces, optionally adding or subtracting a
modifier between 0 and 10000. A zero-faced die always rolls 0.

Option 5: Add a custom spell / edit a bookmarked spell
Create a spell from scratch or rework one of your bookmarks. When
editing, leave an answer blank to keep the spell's current value.

Option 4: View bookmarks
List saved spells, view one in detail, delete one (you will be asked
twice), or sort them by level, by name, or filter them by class.

Option 3: Search for a spell by exact name
Type a full spell name such as 'Shocking Grasp' to print its details.
You can then bookmark it.

Option 2: Search for a spell by keyword
Type part of a name such as 'acid' to list every spell whose name
contains it, then pick one to view and bookmark.

Option 1: Help Manual
Shows this text.

Option 0: Quit
Asks for confirmation, then stops every background service.";

/// Interactive menu driving one spellbook session.
pub struct App<I, W> {
    console: Console<I, W>,
    catalog: CatalogClient,
    session: SpellbookSession,
}

impl<I: LineSource, W: Write> App<I, W> {
    pub fn new(console: Console<I, W>, catalog: CatalogClient, session: SpellbookSession) -> Self {
        Self {
            console,
            catalog,
            session,
        }
    }

    /// Runs until the user confirms quitting or input ends, then shuts the
    /// workers down.
    pub async fn run(&mut self) -> Result<(), ConsoleError> {
        self.console.say(TITLE)?;
        self.console
            .say("\nEasily search for D&D 5e spells for all your campaign needs!")?;

        let outcome = self.menu_loop().await;
        if matches!(outcome, Err(ConsoleError::Closed)) {
            info!("input closed, stopping workers");
        }

        let report = self.session.shutdown_all().await;
        self.report_shutdown(&report)?;

        match outcome {
            Ok(()) | Err(ConsoleError::Closed) => Ok(()),
            Err(error) => Err(error),
        }
    }

    #[cfg(test)]
    pub fn into_parts(self) -> (Console<I, W>, SpellbookSession) {
        (self.console, self.session)
    }

    async fn menu_loop(&mut self) -> Result<(), ConsoleError> {
        loop {
            self.print_menu()?;
            match self
                .console
                .ask_int("Choose an option [0, 1, 2, 3, 4, 5, 6]: ", 0, 6)?
            {
                6 => self.roll_dice().await?,
                5 => self.custom_spell().await?,
                4 => self.bookmarks_menu().await?,
                3 => self.exact_search().await?,
                2 => self.keyword_search().await?,
                1 => {
                    self.console.say(RULE)?;
                    self.console.say(HELP)?;
                    self.console.say(RULE)?;
                }
                _ => {
                    let answer = self.console.ask(
                        "Enter 0 to confirm that you want to quit, otherwise enter any value to return to main menu: ",
                    )?;
                    if answer.parse::<i64>() == Ok(0) {
                        return Ok(());
                    }
                }
            }
        }
    }

    fn print_menu(&mut self) -> Result<(), ConsoleError> {
        self.console.say("\nAPPLICATION FUNCTIONS")?;
        self.console.say("6: Roll a dice (with or without modifiers)")?;
        self.console
            .say("5: Add a custom spell to Bookmarks/Edit a bookmarked spell")?;
        self.console.say("4: View Bookmarks")?;
        self.console.say("3: Search for a spell with exact spell name")?;
        self.console
            .say("2: Search for a spell by a keyword within the spell's name")?;
        self.console.say("1: Help Manual")?;
        self.console.say("0: Quit\n")
    }

    async fn exact_search(&mut self) -> Result<(), ConsoleError> {
        let name = self.console.ask("Enter a spell name: ")?;
        match self.catalog.lookup_by_slug(&name).await {
            Some(spell) => {
                self.console.say("\nSpell found!\n")?;
                self.console.say(render_spell(&spell))?;
                self.offer_bookmark(spell).await
            }
            None => self.console.say("\nSpell not found."),
        }
    }

    async fn keyword_search(&mut self) -> Result<(), ConsoleError> {
        let keyword = self.console.ask("Enter a key word to search for: ")?;
        let matches = self.catalog.search_by_keyword(&keyword).await;
        if matches.is_empty() {
            return self.console.say("\nNo matches were found.");
        }

        let names: Vec<String> = matches.iter().map(|summary| summary.name.clone()).collect();
        self.console.say("\nMatches were found.")?;
        self.print_numbered(&names)?;

        loop {
            self.console.say("\nSPELL OPTIONS")?;
            self.console
                .say("1: Enter spell index to view more details about that spell")?;
            self.console.say("0: Return to main menu\n")?;
            if self.console.ask_int("Select an option [1 or 0]: ", 0, 1)? == 0 {
                return Ok(());
            }

            self.console.say("\nSelect a spell from the given indices.")?;
            self.print_numbered(&names)?;
            let choice = self.ask_index(names.len())?;
            match self.catalog.lookup_by_slug(&matches[choice].index).await {
                Some(spell) => {
                    self.console.say(render_spell(&spell))?;
                    self.offer_bookmark(spell).await?;
                }
                None => self.console.say("Error: spell could not be displayed.")?,
            }
        }
    }

    async fn offer_bookmark(&mut self, spell: Spell) -> Result<(), ConsoleError> {
        let add = self.console.ask_int(
            "Would you like to add this spell to your bookmarks [1 = yes, 0 = no]?: ",
            0,
            1,
        )?;
        if add == 0 {
            return Ok(());
        }

        let before = self.session.bookmarks().len();
        match self.session.add_bookmark(spell).await {
            Ok(MutationOutcome::Replaced) if self.session.bookmarks().len() > before => {
                self.console.say("Spell added to your bookmarks.")
            }
            Ok(MutationOutcome::Replaced) => {
                self.console.say("That spell is already in your bookmarks.")
            }
            Ok(MutationOutcome::Unchanged) => {
                self.console.say("The spell could not be bookmarked.")
            }
            Err(error) => self.report(&error),
        }
    }

    async fn bookmarks_menu(&mut self) -> Result<(), ConsoleError> {
        loop {
            if self.session.bookmarks().is_empty() {
                return self.console.say("You have no spells saved yet!");
            }
            self.list_bookmarks()?;

            self.console.say("\nBOOKMARK OPTIONS")?;
            self.console
                .say("3: Choose a sorting option to sort bookmarked spells by")?;
            self.console.say("2: Enter spell index to delete the spell")?;
            self.console
                .say("1: Enter spell index to view more details about that spell")?;
            self.console.say("0: Return to main menu\n")?;

            match self
                .console
                .ask_int("Select an option [0, 1, 2, or 3]: ", 0, 3)?
            {
                1 => {
                    self.list_bookmarks()?;
                    self.choose_bookmark(
                        "\nSelect the index of a bookmarked spell to view it in more detail.",
                    )?;
                }
                2 => {
                    self.list_bookmarks()?;
                    let spell =
                        self.choose_bookmark("\nSelect the index of a bookmarked spell to delete.")?;
                    self.remove_bookmark(&spell).await?;
                }
                3 => self.sort_bookmarks().await?,
                _ => return Ok(()),
            }
        }
    }

    async fn remove_bookmark(&mut self, spell: &Spell) -> Result<(), ConsoleError> {
        let prompt = "Would you like to remove this spell from your bookmarks [1 = yes, 0 = no]?: ";
        let first = self.console.ask_int(prompt, 0, 1)? == 1;
        if !first {
            return Ok(());
        }
        self.console.say(
            "WARNING: Removing the spell will delete it from your bookmarks. Please confirm that you want to delete it.",
        )?;
        let second = self.console.ask_int(prompt, 0, 1)? == 1;

        let Some(confirmed) = RemovalConfirmation::from_answers(first, second) else {
            return Ok(());
        };
        match self.session.remove_bookmark(spell, confirmed).await {
            Ok(MutationOutcome::Replaced) => self.console.say("Spell removed from your bookmarks."),
            Ok(MutationOutcome::Unchanged) => self.console.say("The spell could not be removed."),
            Err(error) => self.report(&error),
        }
    }

    async fn sort_bookmarks(&mut self) -> Result<(), ConsoleError> {
        self.console.say("\nSORTING OPTIONS")?;
        self.console.say("3: Sort spells by class, alphabetically")?;
        self.console.say("2: Sort spells by name, alphabetically")?;
        self.console
            .say("1: Sort spells by level, ascending or descending")?;
        self.console.say("0: Return to Bookmarks Options\n")?;

        let spec = match self
            .console
            .ask_int("Select an option [0, 1, 2, or 3]: ", 0, 3)?
        {
            1 => {
                self.console.say("SORTING TYPE")?;
                self.console.say("2: Sort spells by level descending")?;
                self.console.say("1: Sort spells by level ascending\n")?;
                let descending = self.console.ask_int("Select an option [1 or 2]: ", 1, 2)? == 2;
                SortSpec::ByLevel { descending }
            }
            2 => SortSpec::ByName,
            3 => SortSpec::ByClass {
                class_name: self.console.ask("Enter the class you want to sort by: ")?,
            },
            _ => return Ok(()),
        };

        match self.session.sort(spec).await {
            Ok(SortOutcome::Sorted(spells)) => {
                for spell in &spells {
                    self.console.say(render_spell(spell))?;
                }
                Ok(())
            }
            Ok(SortOutcome::ClassNotFound) => self.console.say("Class not found."),
            Ok(SortOutcome::NoSpells) => self.console.say("You have no spells saved yet!"),
            Err(error) => self.report(&error),
        }
    }

    async fn custom_spell(&mut self) -> Result<(), ConsoleError> {
        self.console.say("\nNEW SPELL OPTIONS")?;
        self.console
            .say("2: Edit an existing spell in your bookmarks list")?;
        self.console.say("1: Create an entirely new spell")?;
        self.console.say("0: Return to main menu\n")?;

        let spec = match self
            .console
            .ask_int("Select an option [0, 1, or 2]: ", 0, 2)?
        {
            1 => BuildSpec::Create {
                fields: self.ask_spell_fields(false)?,
            },
            2 => {
                if self.session.bookmarks().is_empty() {
                    return self.console.say("No spells are in your bookmarks to edit.");
                }
                self.list_bookmarks()?;
                let target = self.choose_bookmark("\nSelect a spell to edit")?;
                BuildSpec::Edit {
                    target,
                    fields: self.ask_spell_fields(true)?,
                }
            }
            _ => return Ok(()),
        };

        match self.session.build_spell(spec).await {
            Ok(MutationOutcome::Replaced) => self.console.say("Spell saved to your bookmarks."),
            Ok(MutationOutcome::Unchanged) => self
                .console
                .say("The spell builder rejected those answers; your bookmarks were not changed."),
            Err(error) => self.report(&error),
        }
    }

    fn ask_spell_fields(&mut self, editing: bool) -> Result<SpellFields, ConsoleError> {
        self.console.say("")?;
        if editing {
            self.console
                .say("Leave an answer blank to keep the spell's current value.")?;
        }

        let field = |name: &str| format!("Enter a value for the field '{name}': ");
        let mut fields = SpellFields {
            name: self.console.ask(&field("name"))?,
            level: self.console.ask(&field("level"))?,
            range: self.console.ask(&field("range"))?,
            casting_time: self.console.ask(&field("casting_time"))?,
            duration: self.console.ask(&field("duration"))?,
            attack_type: self.console.ask(&field("attack_type"))?,
            desc: self.console.ask("Enter the spell description: ")?,
            higher_level: self
                .console
                .ask("Enter higher level effects (leave empty if none): ")?,
            concentration: self
                .console
                .ask("Does this spell require concentration? (yes/no): ")?,
            ritual: self.console.ask("Is this spell a ritual? (yes/no): ")?,
            components: self
                .console
                .ask("Enter components (separate with commas, e.g., V,S,M): ")?,
            has_damage: self
                .console
                .ask("Does this spell deal damage? (yes/no): ")?,
            ..SpellFields::default()
        };

        if fields.deals_damage() {
            fields.damage_type = Some(
                self.console
                    .ask("Enter damage type (e.g. Fire, Cold, etc.): ")?,
            );
            let scaling = self.console.ask(
                "Does damage scale with slot level or character level? (slot/character): ",
            )?;
            if matches!(scaling.to_ascii_lowercase().as_str(), "slot" | "character") {
                let levels = self.console.ask(&format!(
                    "Enter {scaling} levels to define (comma separated, e.g., 1, 5, 11): "
                ))?;
                let mut damage_values = BTreeMap::new();
                for level in levels.split(',').map(str::trim).filter(|l| !l.is_empty()) {
                    let dice = self
                        .console
                        .ask(&format!("Enter damage for {scaling} level {level}: "))?;
                    damage_values.insert(level.to_string(), dice);
                }
                fields.damage_values = damage_values;
            }
            fields.scaling_type = Some(scaling);
        }

        fields.school = self.console.ask("Enter school of magic: ")?;
        fields.classes = self
            .console
            .ask("Enter classes that can use this spell (comma separated): ")?;
        Ok(fields)
    }

    async fn roll_dice(&mut self) -> Result<(), ConsoleError> {
        let faces = self.console.ask_int(
            "Enter the number of faces on the dice to roll (max number of faces is 10000): ",
            0,
            MAX_DICE_FACES,
        )?;
        let modified = self
            .console
            .ask_yes_no("Do you want to add a modifier to this dice roll? (yes/no): ")?;

        let roll = if modified {
            let operator = loop {
                let answer = self
                    .console
                    .ask("Do you want to add/subtract to the dice roll? (+/-): ")?;
                match answer.parse::<DiceOperator>() {
                    Ok(operator) => break operator,
                    Err(_) => self.console.say("Invalid input. Please enter + or -")?,
                }
            };
            let value = self.console.ask_int(
                "Enter the value of the modifier (max modifier is 10000): ",
                0,
                MAX_DICE_MODIFIER,
            )?;
            DiceRoll::new(faces).and_then(|roll| roll.with_modifier(operator, value))
        } else {
            DiceRoll::new(faces)
        };

        let roll = match roll {
            Ok(roll) => roll,
            Err(error) => return self.console.say(format!("Invalid roll: {error}")),
        };
        match self.session.roll_dice(roll).await {
            Ok(value) => self.console.say(format!("\nYour dice roll result is: {value}")),
            Err(error) => self.report(&error),
        }
    }

    fn list_bookmarks(&mut self) -> Result<(), ConsoleError> {
        let names: Vec<String> = self
            .session
            .bookmarks()
            .iter()
            .map(|spell| spell.name.clone())
            .collect();
        self.console.say("\nBookmarks")?;
        self.print_numbered(&names)
    }

    /// Asks for a 1-based bookmark number, prints that spell and returns it.
    fn choose_bookmark(&mut self, prompt: &str) -> Result<Spell, ConsoleError> {
        self.console.say(prompt)?;
        let index = self.ask_index(self.session.bookmarks().len())?;
        let spell = self.session.bookmarks()[index].clone();
        self.console.say(render_spell(&spell))?;
        Ok(spell)
    }

    fn ask_index(&mut self, count: usize) -> Result<usize, ConsoleError> {
        let max = u32::try_from(count).unwrap_or(u32::MAX);
        let choice = self
            .console
            .ask_int(&format!("\nSpell selection [1 to {count}]: "), 1, max)?;
        Ok(choice as usize - 1)
    }

    fn print_numbered(&mut self, names: &[String]) -> Result<(), ConsoleError> {
        for (number, name) in names.iter().enumerate() {
            self.console.say(format!("{}: {name}", number + 1))?;
        }
        Ok(())
    }

    fn report(&mut self, error: &ClientError) -> Result<(), ConsoleError> {
        warn!(service = %error.service(), %error, "worker call failed");
        self.console.say(format!("Error: {error}"))
    }

    fn report_shutdown(&mut self, report: &ShutdownReport) -> Result<(), ConsoleError> {
        for (service, error) in &report.failed {
            self.console
                .say(format!("Warning: the {service} service did not stop cleanly: {error}"))?;
        }
        self.console.say("\nProgram closed.")
    }
}

#[cfg(test)]
#[path = "tests/app_tests.rs"]
mod tests;
