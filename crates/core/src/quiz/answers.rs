/// Per-question answer slots for one attempt.
///
/// `None` means the learner has not picked an option yet. Slots can be
/// overwritten any number of times; the last write wins.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnswerSheet {
    slots: Vec<Option<usize>>,
}

impl AnswerSheet {
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            slots: vec![None; len],
        }
    }

    /// Record `option` for `question`. Returns `false` if `question` is out of range.
    pub fn set(&mut self, question: usize, option: usize) -> bool {
        match self.slots.get_mut(question) {
            Some(slot) => {
                *slot = Some(option);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn get(&self, question: usize) -> Option<usize> {
        self.slots.get(question).copied().flatten()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// True when every slot holds an answer. An empty sheet is never complete.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.slots.is_empty() && self.slots.iter().all(Option::is_some)
    }

    /// Indices of questions still waiting for an answer.
    #[must_use]
    pub fn unanswered(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.is_none().then_some(i))
            .collect()
    }

    /// Share of answered questions in percent. Display only.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress_percent(&self) -> f64 {
        if self.slots.is_empty() {
            return 0.0;
        }
        self.answered_count() as f64 / self.slots.len() as f64 * 100.0
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Option<usize>] {
        &self.slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_sheet_is_unanswered() {
        let sheet = AnswerSheet::new(3);
        assert_eq!(sheet.len(), 3);
        assert_eq!(sheet.answered_count(), 0);
        assert_eq!(sheet.unanswered(), vec![0, 1, 2]);
        assert!(!sheet.is_complete());
    }

    #[test]
    fn last_write_wins() {
        let mut sheet = AnswerSheet::new(2);
        for option in [0, 3, 1, 2] {
            assert!(sheet.set(1, option));
        }
        assert_eq!(sheet.get(1), Some(2));
        assert_eq!(sheet.answered_count(), 1);
    }

    #[test]
    fn out_of_range_set_is_rejected() {
        let mut sheet = AnswerSheet::new(1);
        assert!(!sheet.set(1, 0));
        assert_eq!(sheet.get(1), None);
    }

    #[test]
    fn progress_and_completion() {
        let mut sheet = AnswerSheet::new(4);
        sheet.set(0, 1);
        assert!((sheet.progress_percent() - 25.0).abs() < f64::EPSILON);
        for q in 1..4 {
            sheet.set(q, 0);
        }
        assert!(sheet.is_complete());
        assert!(sheet.unanswered().is_empty());
        assert!(!AnswerSheet::new(0).is_complete());
    }
}
