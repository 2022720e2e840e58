/// Yes/no decisions that stay with the user: whether to list or fetch
/// missing files, and whether to rename.
pub trait Confirm {
    fn confirm(&mut self, question: &str) -> bool;
}

/// Asks on the terminal; anything but an explicit yes is a no.
pub struct Interactive;

impl Confirm for Interactive {
    fn confirm(&mut self, question: &str) -> bool {
        dialoguer::Confirm::new()
            .with_prompt(question)
            .default(false)
            .interact()
            .unwrap_or(false)
    }
}

/// `--yes`: every question answered yes.
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, question: &str) -> bool {
        tracing::info!("{} yes", question);
        true
    }
}
