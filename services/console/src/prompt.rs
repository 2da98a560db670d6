use client::Prompter;
use dialoguer::{Confirm, Input};

/// Confirmations and notices on the controlling terminal
pub struct DialoguerPrompter;

impl Prompter for DialoguerPrompter {
    fn confirm(&self, question: &str) -> bool {
        // a broken terminal counts as "no"
        Confirm::new()
            .with_prompt(question)
            .default(false)
            .interact()
            .unwrap_or(false)
    }

    fn alert(&self, message: &str) {
        eprintln!("\n⚠️  {}", message);
        // the message is already out; a failed pause just skips the wait
        let _ = Input::<String>::new()
            .with_prompt("Press Enter to continue")
            .allow_empty(true)
            .report(false)
            .interact_text();
    }
}
