use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use winit::{
    event::*,
    event_loop::{ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

// Import from the library crate
use fieldwalk::{config::GameConfig, controller, loader, logging};

use controller::{FrameLoopContext, GameSession, InputController, InputEvent, NoGamepads};

/// Same names the browser reports in `KeyboardEvent.code`
fn key_code_name(code: KeyCode) -> String {
    match code {
        KeyCode::ArrowUp => "ArrowUp".to_string(),
        KeyCode::ArrowDown => "ArrowDown".to_string(),
        KeyCode::ArrowLeft => "ArrowLeft".to_string(),
        KeyCode::ArrowRight => "ArrowRight".to_string(),
        KeyCode::Space => "Space".to_string(),
        other => format!("{other:?}"),
    }
}

/// Movement speed is per frame, so frames are paced like a 60 Hz display refresh
const FRAME_INTERVAL: Duration = Duration::from_micros(16_667);

struct App {
    window: Arc<Window>,
    frame_ctx: FrameLoopContext,
    last_title: String,
    next_frame: Instant,
}

impl App {
    fn new(window: Arc<Window>, config: &GameConfig) -> Self {
        // No gamepad backend natively: zero pads
        let input = Rc::new(RefCell::new(InputController::new(Box::new(NoGamepads))));
        let frame_ctx = FrameLoopContext::new(input);

        let loaded = pollster::block_on(loader::load_scene(&config.asset_path))
            .and_then(|scene| GameSession::from_scene(scene, config));
        match loaded {
            Ok(session) => *frame_ctx.session.borrow_mut() = Some(session),
            Err(e) => tracing::error!("scene not loaded, idling: {e}"),
        }

        Self {
            window,
            frame_ctx,
            last_title: String::new(),
            next_frame: Instant::now(),
        }
    }

    fn input(&mut self, event: &WindowEvent) -> bool {
        let input_event = match event {
            WindowEvent::KeyboardInput { event: KeyEvent { state, physical_key, .. }, .. } => {
                let PhysicalKey::Code(code) = physical_key else { return true };
                match state {
                    ElementState::Pressed => InputEvent::KeyDown(key_code_name(*code)),
                    ElementState::Released => InputEvent::KeyUp(key_code_name(*code)),
                }
            }
            WindowEvent::Focused(false) => InputEvent::FocusLost,
            WindowEvent::Occluded(occluded) => InputEvent::VisibilityChanged { visible: !occluded },
            _ => return false,
        };
        self.frame_ctx.input.borrow_mut().process_event(&input_event);
        true
    }

    fn update(&mut self) {
        let title = match self.frame_ctx.update() {
            Some(report) => {
                let p = report.avatar_position;
                format!("fieldwalk - avatar ({:.3}, {:.3}, {:.3})", p.x, p.y, p.z)
            }
            None => "fieldwalk - not loaded".to_string(),
        };
        if title != self.last_title {
            self.window.set_title(&title);
            self.last_title = title;
        }
    }
}

fn main() {
    logging::init();
    let config = GameConfig::from_env();

    let event_loop = match EventLoop::new() {
        Ok(el) => el,
        Err(e) => {
            tracing::error!("failed to create event loop: {e}");
            return;
        }
    };
    let window_attributes = Window::default_attributes()
        .with_title("fieldwalk")
        .with_inner_size(winit::dpi::LogicalSize::new(800, 600));
    let window = match event_loop.create_window(window_attributes) {
        Ok(w) => Arc::new(w),
        Err(e) => {
            tracing::error!("failed to create window: {e}");
            return;
        }
    };

    let mut app = App::new(window.clone(), &config);

    let result = event_loop.run(move |event, elwt| {
        match event {
            Event::WindowEvent {
                ref event,
                window_id,
            } if window_id == app.window.id() => {
                if !app.input(event) {
                    match event {
                        WindowEvent::CloseRequested => elwt.exit(),
                        WindowEvent::RedrawRequested => app.update(),
                        _ => {}
                    }
                }
            }
            Event::AboutToWait => {
                let now = Instant::now();
                if now >= app.next_frame {
                    app.next_frame = now + FRAME_INTERVAL;
                    app.window.request_redraw();
                }
                elwt.set_control_flow(ControlFlow::WaitUntil(app.next_frame));
            }
            _ => {}
        }
    });
    if let Err(e) = result {
        tracing::error!("event loop error: {e}");
    }
}
