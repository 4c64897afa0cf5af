/// Presentation state of a post's image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageState {
    #[default]
    NotLoaded,
    Loaded,
    Errored,
}

impl ImageState {
    pub fn on_load(&mut self) {
        if *self != ImageState::Errored {
            *self = ImageState::Loaded;
        }
    }

    /// Errored is terminal; the placeholder stays for the post's lifetime.
    pub fn on_error(&mut self) {
        *self = ImageState::Errored;
    }

    pub fn placeholder(&self, has_image: bool) -> Option<&'static str> {
        match (has_image, self) {
            (_, ImageState::Errored) => Some("Image Failed to Load"),
            (false, _) => Some("No Image"),
            (true, ImageState::NotLoaded) => Some("Loading Image..."),
            (true, ImageState::Loaded) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_signal_marks_loaded() {
        let mut state = ImageState::default();
        state.on_load();
        assert_eq!(state, ImageState::Loaded);
        assert_eq!(state.placeholder(true), None);
    }

    #[test]
    fn errored_is_permanent() {
        let mut state = ImageState::NotLoaded;
        state.on_error();
        state.on_load();
        assert_eq!(state, ImageState::Errored);
        assert_eq!(state.placeholder(true), Some("Image Failed to Load"));
    }

    #[test]
    fn placeholders() {
        assert_eq!(ImageState::NotLoaded.placeholder(false), Some("No Image"));
        assert_eq!(ImageState::NotLoaded.placeholder(true), Some("Loading Image..."));
    }
}
