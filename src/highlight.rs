//! Position-relative highlight classes for list and menu rows.

/// How a row relates to the current index. Drives the styling class and the
/// direction of the cursor transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Highlight {
    Selected,
    /// Directly before the selection.
    Previous,
    /// Directly before the selection and also the first row.
    PreviousFirst,
    /// Directly after the selection.
    Next,
    /// First row, not adjacent to the selection.
    First,
    NotSelected,
}

impl Highlight {
    pub fn class(&self) -> &'static str {
        match self {
            Highlight::Selected => "selected",
            Highlight::Previous => "not-selected-previous",
            Highlight::PreviousFirst => "not-selected-previous-first",
            Highlight::Next => "not-selected-next",
            Highlight::First => "not-selected-first",
            Highlight::NotSelected => "not-selected",
        }
    }

    pub fn is_selected(&self) -> bool {
        matches!(self, Highlight::Selected)
    }

    pub fn is_previous(&self) -> bool {
        matches!(self, Highlight::Previous | Highlight::PreviousFirst)
    }

    pub fn is_next(&self) -> bool {
        matches!(self, Highlight::Next)
    }
}

/// Classifies row `index` against `current`. With no current index every row is
/// plain, except the first.
pub fn classify(index: usize, current: Option<usize>) -> Highlight {
    match current {
        Some(c) if index == c => Highlight::Selected,
        Some(c) if index + 1 == c => {
            if index == 0 {
                Highlight::PreviousFirst
            } else {
                Highlight::Previous
            }
        }
        Some(c) if index == c + 1 => Highlight::Next,
        _ if index == 0 => Highlight::First,
        _ => Highlight::NotSelected,
    }
}

/// Classifies every row of a list of length `len`.
pub fn classify_all(len: usize, current: Option<usize>) -> Vec<Highlight> {
    (0..len).map(|index| classify(index, current)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use Highlight::*;

    #[test]
    fn middle_selection() {
        assert_eq!(
            classify_all(5, Some(2)),
            vec![First, Previous, Selected, Next, NotSelected]
        );
    }

    #[test]
    fn second_row_selected_marks_previous_first() {
        assert_eq!(classify_all(4, Some(1)), vec![PreviousFirst, Selected, Next, NotSelected]);
    }

    #[test]
    fn first_row_selected() {
        assert_eq!(classify_all(3, Some(0)), vec![Selected, Next, NotSelected]);
    }

    #[test]
    fn last_row_selected() {
        assert_eq!(classify_all(4, Some(3)), vec![First, NotSelected, Previous, Selected]);
    }

    #[test]
    fn no_current_index() {
        assert_eq!(classify_all(3, None), vec![First, NotSelected, NotSelected]);
    }

    #[test]
    fn class_names() {
        assert_eq!(PreviousFirst.class(), "not-selected-previous-first");
        assert_eq!(NotSelected.class(), "not-selected");
    }
}
