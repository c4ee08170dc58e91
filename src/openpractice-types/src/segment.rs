use crate::Exercise;

/// Named chunk of a practice. `order` fixes display and replay position
/// inside the owning practice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PracticeSegment {
    pub name: String,
    pub order: u32,
    pub exercises: Vec<Exercise>,
}

impl PracticeSegment {
    pub fn new(name: &str, order: u32, exercises: Vec<Exercise>) -> Self {
        Self {
            name: name.to_string(),
            order,
            exercises,
        }
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }
}
