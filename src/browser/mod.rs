pub mod capture;
pub mod headless;

pub use capture::{
    capture_route_screenshot, capture_route_screenshot_blocking, CaptureOptions, HeadlessCapture,
};
pub use headless::launch_headless_browser;
