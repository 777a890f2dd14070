use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;
use tracing::trace;

use crate::controller::input::InputController;
use crate::controller::movement::StepOutcome;
use crate::controller::session::GameSession;

/// What one frame did, for the platform driver
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub frame: u64,
    pub avatar_position: Vec3,
    pub outcome: StepOutcome,
    pub action: bool,
}

/// Per-frame update state shared with the platform callbacks.
/// `session` stays `None` until the asset has loaded; on load failure it never fills.
pub struct FrameLoopContext {
    pub input: Rc<RefCell<InputController>>,
    pub session: Rc<RefCell<Option<GameSession>>>,
    pub frame: u64,
}

impl FrameLoopContext {
    pub fn new(input: Rc<RefCell<InputController>>) -> Self {
        Self {
            input,
            session: Rc::new(RefCell::new(None)),
            frame: 0,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.session.borrow().is_some()
    }

    /// Run one frame. Returns `None` while not ready: nothing is moved or queried.
    pub fn update(&mut self) -> Option<FrameReport> {
        self.frame += 1;

        let mut session = self.session.borrow_mut();
        let session = session.as_mut()?;

        // Read input once so the step sees a consistent state
        let intent = {
            let mut input = self.input.borrow_mut();
            input.refresh_snapshots();
            input.poll()
        };

        let outcome = session.update(&intent);
        let avatar_position = session.avatar_position();
        trace!(frame = self.frame, ?avatar_position, ?outcome, "frame");

        Some(FrameReport {
            frame: self.frame,
            avatar_position,
            outcome,
            action: intent.action,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::controller::input::NoGamepads;
    use crate::model::{Aabb, SceneGraph};
    use glam::Mat4;

    fn context() -> FrameLoopContext {
        FrameLoopContext::new(Rc::new(RefCell::new(InputController::new(Box::new(NoGamepads)))))
    }

    fn session() -> GameSession {
        let mut g = SceneGraph::new();
        g.add_node(None, "avater", Mat4::from_translation(Vec3::new(4.99, 0.0, 0.0)), None);
        let field = g.add_node(None, "field", Mat4::IDENTITY, None);
        g.add_node(
            Some(field),
            "rock",
            Mat4::IDENTITY,
            Some(Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0))),
        );
        GameSession::from_scene(g, &GameConfig::default()).unwrap()
    }

    #[test]
    fn test_idle_until_ready() {
        let mut ctx = context();
        ctx.input.borrow_mut().on_key_down("ArrowRight");

        assert!(!ctx.is_ready());
        assert_eq!(ctx.update(), None);
        assert_eq!(ctx.update(), None);
        assert_eq!(ctx.frame, 2);
    }

    #[test]
    fn test_keyboard_drives_avatar_to_arena_edge() {
        let mut ctx = context();
        *ctx.session.borrow_mut() = Some(session());
        assert!(ctx.is_ready());

        ctx.input.borrow_mut().on_key_down("ArrowRight");
        let report = ctx.update().unwrap();
        assert_eq!(report.outcome, StepOutcome::Committed);
        assert_eq!(report.avatar_position, Vec3::new(5.0, 0.1, 0.0));
        assert!(!report.action);

        ctx.input.borrow_mut().on_key_up("ArrowRight");
        ctx.input.borrow_mut().on_key_down("Space");
        let report = ctx.update().unwrap();
        assert_eq!(report.avatar_position, Vec3::new(5.0, 0.1, 0.0));
        assert!(report.action);
    }
}
