use crate::{
    error::HabitError,
    habit::{HabitDraft, HabitId},
    store::HabitStore,
};

/// State behind the "new habit" intent: the draft plus the inline missing-title warning.
#[derive(Debug, Clone, Default)]
pub struct NewHabitForm {
    pub draft: HabitDraft,
    pub title_warning: bool,
}

impl NewHabitForm {
    pub fn new(draft: HabitDraft) -> Self {
        Self {
            draft,
            title_warning: false,
        }
    }

    /// Adds the draft to the store. A rejected title raises the warning and leaves the
    /// collection untouched.
    pub fn submit(&mut self, store: &mut HabitStore) -> Option<HabitId> {
        match store.add(self.draft.clone()) {
            Ok(id) => {
                self.title_warning = false;
                Some(id)
            }
            Err(HabitError::EmptyTitle) => {
                self.title_warning = true;
                None
            }
            Err(err) => {
                tracing::warn!(%err, "new habit rejected");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_title_sets_warning() {
        let mut store = HabitStore::builder().build();
        let mut form = NewHabitForm::default();
        assert_eq!(form.submit(&mut store), None);
        assert!(form.title_warning);
        assert!(store.is_empty());

        form.draft.title = "Drink water".into();
        let id = form.submit(&mut store).expect("habit added");
        assert!(!form.title_warning);
        assert_eq!(store.get(id).map(|h| h.title.as_str()), Some("Drink water"));
    }
}
