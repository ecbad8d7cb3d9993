/// Queue families a device must expose to render into a window.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct QueueFamilyIndices {
    pub graphics_family: Option<usize>,
    pub present_family: Option<usize>,
}

impl QueueFamilyIndices {
    pub fn new() -> Self {
        QueueFamilyIndices::default()
    }

    pub fn is_complete(&self) -> bool {
        self.graphics_family.is_some() && self.present_family.is_some()
    }

    pub fn is_shared(&self) -> bool {
        self.graphics_family == self.present_family
    }

    /// Distinct family indices, graphics first.
    pub fn unique(&self) -> Vec<usize> {
        let mut families: Vec<usize> = self
            .graphics_family
            .into_iter()
            .chain(self.present_family)
            .collect();
        families.dedup();
        families
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incomplete_until_both_families_are_found() {
        let mut indices = QueueFamilyIndices::new();
        assert!(!indices.is_complete());
        indices.graphics_family = Some(0);
        assert!(!indices.is_complete());
        indices.present_family = Some(0);
        assert!(indices.is_complete());
    }

    #[test]
    fn shared_family_is_requested_once() {
        let indices = QueueFamilyIndices {
            graphics_family: Some(1),
            present_family: Some(1),
        };
        assert!(indices.is_shared());
        assert_eq!(indices.unique(), vec![1]);

        let split = QueueFamilyIndices {
            graphics_family: Some(0),
            present_family: Some(2),
        };
        assert!(!split.is_shared());
        assert_eq!(split.unique(), vec![0, 2]);
    }
}
