// Re-export all public modules so they can be used from main.rs
pub mod logging;
pub mod config;
pub mod loader;

// MVC Architecture (rendering is left to the host page / engine)
pub mod model;
pub mod controller;

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::{prelude::wasm_bindgen, JsCast, JsValue};
    use web_sys::{Document, Event, GamepadEvent, KeyboardEvent, Window};

    use crate::config::GameConfig;
    use crate::controller::input::wasm::{gamepad_event_to_input, keyboard_event_to_input, WebGamepads};
    use crate::controller::{FrameLoopContext, GameSession, InputController, InputEvent};
    use crate::{loader, logging};

    #[wasm_bindgen(start)]
    pub fn start() -> Result<(), JsValue> {
        logging::init();

        let window = web_sys::window().ok_or(js_error("no global `window`"))?;
        let document = window.document().ok_or(js_error("no document on window"))?;
        setup_app(&window, &document, GameConfig::default())
    }

    /// Wire input listeners, kick off the asset load and start the frame loop
    fn setup_app(window: &Window, document: &Document, config: GameConfig) -> Result<(), JsValue> {
        let input = Rc::new(RefCell::new(InputController::new(Box::new(WebGamepads::new()))));
        setup_input_listeners(window, document, input.clone())?;

        let mut frame_ctx = FrameLoopContext::new(input);

        // Loaded exactly once; a failure leaves the loop idling forever
        {
            let session = frame_ctx.session.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let loaded = loader::load_scene(&config.asset_path)
                    .await
                    .and_then(|scene| GameSession::from_scene(scene, &config));
                match loaded {
                    Ok(s) => *session.borrow_mut() = Some(s),
                    Err(e) => tracing::error!("scene not loaded: {e}"),
                }
            });
        }

        let f = RcCellCallback::new(window.clone(), move || {
            frame_ctx.update();
        });
        f.start();

        Ok(())
    }

    fn setup_input_listeners(
        window: &Window,
        document: &Document,
        input: Rc<RefCell<InputController>>,
    ) -> Result<(), JsValue> {
        // Keyboard down
        {
            let input = input.clone();
            let keydown = Closure::wrap(Box::new(move |e: KeyboardEvent| {
                if matches!(
                    e.code().as_str(),
                    "ArrowUp" | "ArrowDown" | "ArrowLeft" | "ArrowRight" | "Space"
                ) {
                    e.prevent_default();
                }
                input.borrow_mut().process_event(&keyboard_event_to_input(&e, true));
            }) as Box<dyn FnMut(KeyboardEvent)>);
            window.add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())?;
            keydown.forget();
        }

        // Keyboard up
        {
            let input = input.clone();
            let keyup = Closure::wrap(Box::new(move |e: KeyboardEvent| {
                input.borrow_mut().process_event(&keyboard_event_to_input(&e, false));
            }) as Box<dyn FnMut(KeyboardEvent)>);
            window.add_event_listener_with_callback("keyup", keyup.as_ref().unchecked_ref())?;
            keyup.forget();
        }

        // Gamepad connect / disconnect
        for (name, connected) in [("gamepadconnected", true), ("gamepaddisconnected", false)] {
            let input = input.clone();
            let handler = Closure::wrap(Box::new(move |e: GamepadEvent| {
                if let Some(event) = gamepad_event_to_input(&e, connected) {
                    input.borrow_mut().process_event(&event);
                }
            }) as Box<dyn FnMut(GamepadEvent)>);
            window.add_event_listener_with_callback(name, handler.as_ref().unchecked_ref())?;
            handler.forget();
        }

        // Focus loss - release all keys
        {
            let input = input.clone();
            let blur = Closure::wrap(Box::new(move |_e: Event| {
                input.borrow_mut().process_event(&InputEvent::FocusLost);
            }) as Box<dyn FnMut(Event)>);
            window.add_event_listener_with_callback("blur", blur.as_ref().unchecked_ref())?;
            blur.forget();
        }

        // Visibility change - release all keys
        {
            let input = input.clone();
            let doc = document.clone();
            let visibility = Closure::wrap(Box::new(move |_e: Event| {
                let visible = !doc.hidden();
                input.borrow_mut().process_event(&InputEvent::VisibilityChanged { visible });
            }) as Box<dyn FnMut(Event)>);
            document.add_event_listener_with_callback("visibilitychange", visibility.as_ref().unchecked_ref())?;
            visibility.forget();
        }

        Ok(())
    }

    fn js_error<E: Into<String>>(msg: E) -> JsValue {
        JsValue::from_str(&msg.into())
    }

    /// requestAnimationFrame loop around a boxed closure
    struct RcCellCallback {
        inner: Rc<RefCell<Box<dyn FnMut()>>>,
        window: Window,
    }

    impl RcCellCallback {
        fn new(window: Window, f: impl FnMut() + 'static) -> Self {
            Self {
                inner: Rc::new(RefCell::new(Box::new(f))),
                window,
            }
        }

        fn start(self) {
            let inner = self.inner.clone();
            let window = self.window.clone();

            let callback = Rc::new(RefCell::new(None::<Closure<dyn FnMut()>>));
            let callback_clone = callback.clone();

            *callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
                inner.borrow_mut().as_mut()();

                // Schedule the next frame
                if let Some(cb) = callback_clone.borrow().as_ref() {
                    if let Err(e) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                        tracing::error!("requestAnimationFrame failed: {e:?}");
                    }
                }
            }) as Box<dyn FnMut()>));

            if let Some(cb) = callback.borrow().as_ref() {
                if let Err(e) = self.window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                    tracing::error!("requestAnimationFrame failed: {e:?}");
                }
            }

            // Leak the closure to keep it alive
            std::mem::forget(callback);
        }
    }
}
