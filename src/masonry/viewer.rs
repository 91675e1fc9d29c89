//! Full-screen viewer over the active filtered list.
//!
//! The viewer shows an image's preview first; the original is only requested
//! through an explicit action. Navigation clamps at both ends. Every open,
//! switch and close bumps a generation counter, and every asynchronous reply
//! (full-resolution load, EXIF lookup, display load) carries the token it was
//! requested with, so replies that arrive after the user moved on are dropped.

use crate::types::ImageDescriptor;

/// Identifies the image a request was made for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewToken {
    generation: u64,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerKey {
    Escape,
    ArrowLeft,
    ArrowRight,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewerInput {
    Key(ViewerKey),
    TouchStart { x: f64, y: f64 },
    TouchEnd { x: f64, y: f64 },
    Previous,
    Next,
    Close,
    /// A click on the backdrop outside the image.
    OutsideClick,
    /// The manual "load original" action.
    LoadOriginal,
}

/// Side effects the host must carry out.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerCommand {
    /// Put `url` in the image element and show the spinner until it loads.
    Show { token: ViewToken, url: String },
    RequestExif { token: ViewToken, url: String },
    RequestFullRes { token: ViewToken, url: String },
    /// Abort the pending full-resolution download.
    CancelFullRes,
    Closed,
}

/// Camera metadata shown under the image. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExifData {
    pub aperture: Option<String>,
    pub shutter_speed: Option<String>,
    pub iso: Option<String>,
    pub focal_length: Option<String>,
    pub camera: Option<String>,
    pub lens: Option<String>,
    pub gps: Option<String>,
    pub date_time: Option<String>,
}

impl ExifData {
    /// `(label, value)` pairs for the fields that are present, in panel order.
    pub fn lines(&self) -> Vec<(&'static str, &str)> {
        [
            ("Aperture", &self.aperture),
            ("Shutter", &self.shutter_speed),
            ("ISO", &self.iso),
            ("Focal length", &self.focal_length),
            ("Camera", &self.camera),
            ("Lens", &self.lens),
            ("Location", &self.gps),
            ("Taken", &self.date_time),
        ]
        .into_iter()
        .filter_map(|(label, value)| value.as_deref().map(|v| (label, v)))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.lines().is_empty()
    }
}

/// Observable state while the viewer is open.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerState {
    pub current_index: usize,
    pub current_original_url: String,
    pub display_url: String,
    pub spinner: bool,
    /// Hidden when the preview already is the original.
    pub show_load_original: bool,
    pub full_res_pending: bool,
    pub exif: Option<ExifData>,
}

#[derive(Debug, Clone)]
pub struct Viewer {
    state: Option<ViewerState>,
    generation: u64,
    swipe_threshold: f64,
    touch_start: Option<(f64, f64)>,
}

impl Viewer {
    pub fn new(swipe_threshold: f64) -> Self {
        Self {
            state: None,
            generation: 0,
            swipe_threshold,
            touch_start: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.state.is_some()
    }

    pub fn state(&self) -> Option<&ViewerState> {
        self.state.as_ref()
    }

    fn token(&self) -> Option<ViewToken> {
        self.state.as_ref().map(|s| ViewToken {
            generation: self.generation,
            index: s.current_index,
        })
    }

    fn is_current(&self, token: ViewToken) -> bool {
        self.token() == Some(token)
    }

    /// Open at the image whose original URL matches.
    ///
    /// An image missing from the list opens the first one instead. An empty
    /// list cannot be viewed.
    pub fn open(&mut self, list: &[ImageDescriptor], original_url: &str) -> Vec<ViewerCommand> {
        if list.is_empty() {
            log::warn!("viewer: nothing to show");
            return Vec::new();
        }
        let index = list
            .iter()
            .position(|img| img.original_url == original_url)
            .unwrap_or_else(|| {
                log::warn!("viewer: {original_url} is not in the active list, showing the first image");
                0
            });
        self.switch(list, index)
    }

    pub fn close(&mut self) -> Vec<ViewerCommand> {
        let Some(state) = self.state.take() else {
            return Vec::new();
        };
        self.generation += 1;
        self.touch_start = None;
        let mut commands = Vec::new();
        if state.full_res_pending {
            commands.push(ViewerCommand::CancelFullRes);
        }
        commands.push(ViewerCommand::Closed);
        commands
    }

    pub fn next(&mut self, list: &[ImageDescriptor]) -> Vec<ViewerCommand> {
        let target = match self.state.as_ref() {
            Some(s) if s.current_index + 1 < list.len() => s.current_index + 1,
            _ => return Vec::new(),
        };
        self.switch(list, target)
    }

    pub fn previous(&mut self, list: &[ImageDescriptor]) -> Vec<ViewerCommand> {
        let target = match self.state.as_ref() {
            Some(s) if s.current_index > 0 && s.current_index <= list.len() => s.current_index - 1,
            _ => return Vec::new(),
        };
        self.switch(list, target)
    }

    pub fn handle(&mut self, input: ViewerInput, list: &[ImageDescriptor]) -> Vec<ViewerCommand> {
        if !self.is_open() {
            return Vec::new();
        }
        match input {
            ViewerInput::Key(ViewerKey::Escape) | ViewerInput::Close | ViewerInput::OutsideClick => {
                self.close()
            }
            ViewerInput::Key(ViewerKey::ArrowLeft) | ViewerInput::Previous => self.previous(list),
            ViewerInput::Key(ViewerKey::ArrowRight) | ViewerInput::Next => self.next(list),
            ViewerInput::TouchStart { x, y } => {
                self.touch_start = Some((x, y));
                Vec::new()
            }
            ViewerInput::TouchEnd { x, y } => {
                let Some((sx, sy)) = self.touch_start.take() else {
                    return Vec::new();
                };
                let (dx, dy) = (x - sx, y - sy);
                if dx.abs() > self.swipe_threshold && dx.abs() > dy.abs() {
                    if dx > 0.0 {
                        self.previous(list)
                    } else {
                        self.next(list)
                    }
                } else {
                    Vec::new()
                }
            }
            ViewerInput::LoadOriginal => self.request_full_res().into_iter().collect(),
        }
    }

    /// Start loading the original of the current image.
    pub fn request_full_res(&mut self) -> Option<ViewerCommand> {
        let token = self.token()?;
        let state = self.state.as_mut()?;
        if !state.show_load_original || state.full_res_pending {
            return None;
        }
        state.full_res_pending = true;
        state.spinner = true;
        Some(ViewerCommand::RequestFullRes {
            token,
            url: state.current_original_url.clone(),
        })
    }

    /// The host finished (or failed) a full-resolution load.
    pub fn complete_full_res(&mut self, token: ViewToken, loaded: bool) {
        if !self.is_current(token) {
            log::debug!("viewer: dropping stale full-resolution result for #{}", token.index);
            return;
        }
        if let Some(state) = self.state.as_mut() {
            state.full_res_pending = false;
            state.spinner = false;
            if loaded {
                state.display_url = state.current_original_url.clone();
                state.show_load_original = false;
            } else {
                log::warn!("viewer: original {} failed to load", state.current_original_url);
            }
        }
    }

    /// The displayed image finished loading.
    pub fn display_loaded(&mut self, token: ViewToken) {
        if !self.is_current(token) {
            return;
        }
        if let Some(state) = self.state.as_mut() {
            if !state.full_res_pending {
                state.spinner = false;
            }
        }
    }

    /// EXIF lookup result. `None` clears the panel.
    pub fn apply_exif(&mut self, token: ViewToken, exif: Option<ExifData>) {
        if !self.is_current(token) {
            log::debug!("viewer: dropping stale EXIF for #{}", token.index);
            return;
        }
        if let Some(state) = self.state.as_mut() {
            state.exif = exif.filter(|e| !e.is_empty());
        }
    }

    fn switch(&mut self, list: &[ImageDescriptor], index: usize) -> Vec<ViewerCommand> {
        let mut commands = Vec::new();
        if self.state.as_ref().is_some_and(|s| s.full_res_pending) {
            commands.push(ViewerCommand::CancelFullRes);
        }
        self.show(list, index, commands)
    }

    fn show(
        &mut self,
        list: &[ImageDescriptor],
        index: usize,
        mut commands: Vec<ViewerCommand>,
    ) -> Vec<ViewerCommand> {
        let image = &list[index];
        self.generation += 1;
        self.state = Some(ViewerState {
            current_index: index,
            current_original_url: image.original_url.clone(),
            display_url: image.preview_url.clone(),
            spinner: true,
            show_load_original: image.preview_url != image.original_url,
            full_res_pending: false,
            exif: None,
        });
        let token = ViewToken {
            generation: self.generation,
            index,
        };
        commands.push(ViewerCommand::Show {
            token,
            url: image.preview_url.clone(),
        });
        commands.push(ViewerCommand::RequestExif {
            token,
            url: image.original_url.clone(),
        });
        commands
    }
}
