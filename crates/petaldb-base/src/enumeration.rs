use crate::violation::ConstraintViolation;

///
/// Enumeration
///
/// A fixed, ordered list of display labels for a categorical field. The
/// persisted value of such a field is always the 1-based index; labels are
/// display-only.
///

#[derive(Clone, Copy, Debug)]
pub struct Enumeration {
    labels: &'static [&'static str],
}

impl Enumeration {
    #[must_use]
    pub const fn new(labels: &'static [&'static str]) -> Self {
        Self { labels }
    }

    /// Number of labels; valid indexes are `1..=max()`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn max(&self) -> u32 {
        self.labels.len() as u32
    }

    /// The label at a 1-based index.
    #[must_use]
    pub fn label(&self, index: u32) -> Option<&'static str> {
        if (1..=self.max()).contains(&index) {
            Some(self.labels[(index - 1) as usize])
        } else {
            None
        }
    }

    /// The 1-based index of a label.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn index_of(&self, label: &str) -> Option<u32> {
        self.labels
            .iter()
            .position(|l| *l == label)
            .map(|pos| pos as u32 + 1)
    }

    #[must_use]
    pub const fn labels(&self) -> &'static [&'static str] {
        self.labels
    }

    /// Check that `index` names one of the labels.
    pub fn check(&self, index: u32, field: &str) -> Result<(), ConstraintViolation> {
        if (1..=self.max()).contains(&index) {
            Ok(())
        } else {
            Err(ConstraintViolation::range(format!(
                "invalid value for {field}: {index}"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Enumeration;
    use crate::violation::ConstraintViolation;

    static SIZES: Enumeration = Enumeration::new(&["small", "medium", "large", "x-large"]);

    #[test]
    fn lookups_are_one_based() {
        assert_eq!(SIZES.max(), 4);
        assert_eq!(SIZES.label(1), Some("small"));
        assert_eq!(SIZES.label(4), Some("x-large"));
        assert_eq!(SIZES.label(0), None);
        assert_eq!(SIZES.label(5), None);
        assert_eq!(SIZES.index_of("medium"), Some(2));
        assert_eq!(SIZES.index_of("XL"), None);
    }

    #[test]
    fn check_rejects_out_of_bounds() {
        assert!(SIZES.check(1, "vase size").is_ok());
        assert!(SIZES.check(4, "vase size").is_ok());
        assert_eq!(
            SIZES.check(0, "vase size"),
            Err(ConstraintViolation::range("invalid value for vase size: 0"))
        );
        assert!(SIZES.check(9, "vase size").is_err());
    }
}
