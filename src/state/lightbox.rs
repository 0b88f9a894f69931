/// Full-size viewer over a photo sequence owned by the caller.
///
/// Navigation clamps at both ends; there is no wraparound.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Lightbox {
    selected: Option<usize>,
}

impl Lightbox {
    pub fn open(&mut self, index: usize, len: usize) {
        if index < len {
            self.selected = Some(index);
        }
    }

    pub fn close(&mut self) {
        self.selected = None;
    }

    pub fn is_open(&self) -> bool {
        self.selected.is_some()
    }

    pub fn index(&self) -> Option<usize> {
        self.selected
    }

    pub fn next(&mut self, len: usize) {
        if let Some(index) = self.selected {
            if index + 1 < len {
                self.selected = Some(index + 1);
            }
        }
    }

    pub fn previous(&mut self) {
        if let Some(index) = self.selected {
            if index > 0 {
                self.selected = Some(index - 1);
            }
        }
    }

    pub fn current<'a, T>(&self, items: &'a [T]) -> Option<&'a T> {
        self.selected.and_then(|index| items.get(index))
    }
}
