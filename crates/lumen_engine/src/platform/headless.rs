//! Window system without a window
//!
//! Swaps only count frames. Events are whatever the caller queued. With a frame limit
//! the window asks to close once that many frames were presented.

use std::collections::VecDeque;

use super::{PlatformError, WindowEvent, WindowSystem};
use crate::core::config::WindowConfig;

/// Window system for runs without a display
#[derive(Debug)]
pub struct HeadlessWindowSystem {
    title: String,
    width: u32,
    height: u32,
    vsync: bool,
    frame_limit: Option<u64>,
    frames_presented: u64,
    pending: VecDeque<WindowEvent>,
    close_requested: bool,
    elapsed: f32,
}

impl HeadlessWindowSystem {
    /// Queue an event for the next poll
    ///
    /// A queued resize also changes the reported size once it is polled.
    pub fn push_event(&mut self, event: WindowEvent) {
        self.pending.push_back(event);
    }

    /// Number of presented frames
    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// Window title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Whether swaps would wait for vertical sync
    pub fn vsync(&self) -> bool {
        self.vsync
    }

    /// Seconds accumulated through [`WindowSystem::update`]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

impl WindowSystem for HeadlessWindowSystem {
    fn create(config: &WindowConfig) -> Result<Self, PlatformError> {
        if config.width == 0 || config.height == 0 {
            return Err(PlatformError::CreationFailed(format!(
                "window size {}x{} is invalid",
                config.width, config.height
            )));
        }
        log::info!("Headless window '{}' {}x{}", config.title, config.width, config.height);
        Ok(Self {
            title: config.title.clone(),
            width: config.width,
            height: config.height,
            vsync: config.vsync,
            frame_limit: config.headless_frame_limit,
            frames_presented: 0,
            pending: VecDeque::new(),
            close_requested: false,
            elapsed: 0.0,
        })
    }

    fn configure(&mut self, config: &WindowConfig) {
        self.title.clone_from(&config.title);
        self.width = config.width;
        self.height = config.height;
        self.vsync = config.vsync;
        self.frame_limit = config.headless_frame_limit;
    }

    fn swap_buffers(&mut self) {
        self.frames_presented += 1;
    }

    fn poll_events(&mut self) -> Vec<WindowEvent> {
        let events: Vec<WindowEvent> = self.pending.drain(..).collect();
        for event in &events {
            match *event {
                WindowEvent::Resized { width, height } => {
                    self.width = width;
                    self.height = height;
                }
                WindowEvent::CloseRequested => self.close_requested = true,
                WindowEvent::FilesDropped(_) => {}
            }
        }
        events
    }

    fn should_close(&self) -> bool {
        self.close_requested || self.frame_limit.is_some_and(|limit| self.frames_presented >= limit)
    }

    fn update(&mut self, dt: f32) {
        self.elapsed += dt;
    }

    fn destroy(&mut self) {
        self.close_requested = true;
        self.pending.clear();
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn set_vsync(&mut self, enabled: bool) {
        self.vsync = enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_limit_closes_window() {
        let config = WindowConfig::default().with_frame_limit(2);
        let mut window = HeadlessWindowSystem::create(&config).unwrap();
        assert!(!window.should_close());
        window.swap_buffers();
        assert!(!window.should_close());
        window.swap_buffers();
        assert!(window.should_close());
    }

    #[test]
    fn test_events_are_delivered_once() {
        let mut window = HeadlessWindowSystem::create(&WindowConfig::default()).unwrap();
        window.push_event(WindowEvent::Resized { width: 640, height: 480 });
        window.push_event(WindowEvent::CloseRequested);

        let events = window.poll_events();
        assert_eq!(events.len(), 2);
        assert_eq!(window.size(), (640, 480));
        assert!(window.should_close());
        assert!(window.poll_events().is_empty());
    }

    #[test]
    fn test_zero_size_is_rejected() {
        let config = WindowConfig::default().with_size(0, 10);
        assert!(matches!(
            HeadlessWindowSystem::create(&config),
            Err(PlatformError::CreationFailed(_))
        ));
    }
}
