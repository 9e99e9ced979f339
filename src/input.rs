use egui::{Context, Key, Modifiers, PointerButton, Pos2, Rect};

/// Represents the location where an input event occurred
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputLocation {
    /// Canvas-local position in device pixels
    pub position: Pos2,
    /// Whether this position is within the canvas bounds
    pub is_in_canvas: bool,
}

/// Input events the screen controller understands
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Primary button or finger went down
    PointerDown { location: InputLocation },
    /// Primary button or finger was released
    PointerUp { location: InputLocation },
    /// Pointer moved
    PointerMove {
        location: InputLocation,
        primary_held: bool,
    },
    /// Key was pressed
    KeyDown { key: Key, modifiers: Modifiers },
}

/// Converts raw egui input into canvas-local [`InputEvent`]s
pub struct InputHandler {
    last_pointer_pos: Option<Pos2>,
    /// Survives `PointerGone`, so a release reported without a position still has one
    last_known_pos: Option<Pos2>,
    primary_down: bool,
    canvas_rect: Rect,
    pixels_per_point: f32,
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new(Rect::NOTHING, 1.0)
    }
}

impl InputHandler {
    pub fn new(canvas_rect: Rect, pixels_per_point: f32) -> Self {
        Self {
            last_pointer_pos: None,
            last_known_pos: None,
            primary_down: false,
            canvas_rect,
            pixels_per_point,
        }
    }

    /// Update the canvas placement (e.g. if window is resized or moved between displays)
    pub fn set_canvas_rect(&mut self, rect: Rect, pixels_per_point: f32) {
        self.canvas_rect = rect;
        self.pixels_per_point = pixels_per_point;
    }

    /// Map a screen position in points to a canvas-local position in device pixels
    pub fn make_location(&self, pos: Pos2) -> InputLocation {
        let local = (pos - self.canvas_rect.min) * self.pixels_per_point;
        InputLocation {
            position: local.to_pos2(),
            is_in_canvas: self.canvas_rect.contains(pos),
        }
    }

    /// Process raw egui input and generate our InputEvents
    ///
    /// Every `PointerDown` is matched by exactly one `PointerUp`, including when a
    /// touch ends with the finger lifted and the pointer gone in the same frame,
    /// or the pointer leaves without any release at all.
    pub fn process_input(&mut self, ctx: &Context) -> Vec<InputEvent> {
        let mut events = Vec::new();
        // Shortcuts belong to the focused text field while it is being edited
        let text_has_focus = ctx.wants_keyboard_input();

        ctx.input(|input| {
            let pointer_pos = input.pointer.latest_pos();
            let primary_held = input.pointer.button_down(PointerButton::Primary);

            if let Some(pos) = pointer_pos {
                if Some(pos) != self.last_pointer_pos {
                    events.push(InputEvent::PointerMove {
                        location: self.make_location(pos),
                        primary_held,
                    });
                }
            }
            self.last_pointer_pos = pointer_pos;
            if let Some(pos) = pointer_pos.or(input.pointer.interact_pos()) {
                self.last_known_pos = Some(pos);
            }

            if input.pointer.button_pressed(PointerButton::Primary) {
                if let Some(pos) = self.last_known_pos {
                    events.push(InputEvent::PointerDown {
                        location: self.make_location(pos),
                    });
                    self.primary_down = true;
                }
            }

            let released = input.pointer.button_released(PointerButton::Primary);
            if self.primary_down && (released || pointer_pos.is_none()) {
                if let Some(pos) = self.last_known_pos {
                    if !released {
                        log::debug!("Pointer gone while pressed, ending stroke");
                    }
                    events.push(InputEvent::PointerUp {
                        location: self.make_location(pos),
                    });
                }
                self.primary_down = false;
            }

            if text_has_focus {
                return;
            }
            for event in &input.raw.events {
                if let egui::Event::Key {
                    key,
                    pressed: true,
                    modifiers,
                    ..
                } = event
                {
                    events.push(InputEvent::KeyDown {
                        key: *key,
                        modifiers: *modifiers,
                    });
                }
            }
        });

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::RedoPolicy;
    use crate::controller::ScreenController;
    use crate::storage::CacheDirStore;
    use egui::{Event, Id, RawInput, pos2, vec2};
    use std::sync::Arc;

    struct Harness {
        ctx: Context,
        handler: InputHandler,
        controller: ScreenController,
    }

    impl Harness {
        fn new() -> Self {
            let mut controller =
                ScreenController::new(RedoPolicy::ClearOnCommit, Arc::new(CacheDirStore::default()));
            controller.canvas_mut().resize(200, 200);
            Self {
                ctx: Context::default(),
                handler: InputHandler::new(Rect::from_min_size(Pos2::ZERO, vec2(200.0, 200.0)), 1.0),
                controller,
            }
        }

        /// Runs one egui frame with `events` and routes the result into the controller
        fn frame(&mut self, events: Vec<Event>) -> Vec<InputEvent> {
            self.frame_with(events, |_| {})
        }

        fn frame_with(&mut self, events: Vec<Event>, before: impl Fn(&Context)) -> Vec<InputEvent> {
            let Self {
                ctx,
                handler,
                controller,
            } = self;
            let mut produced = Vec::new();
            let input = RawInput {
                events,
                ..Default::default()
            };
            let _ = ctx.run(input, |ctx| {
                before(ctx);
                for event in handler.process_input(ctx) {
                    controller.handle_input(&event);
                    produced.push(event);
                }
            });
            produced
        }

        fn committed(&self) -> usize {
            self.controller.canvas().committed().len()
        }
    }

    fn moved(x: f32, y: f32) -> Event {
        Event::PointerMoved(pos2(x, y))
    }

    fn primary(x: f32, y: f32, pressed: bool) -> Event {
        Event::PointerButton {
            pos: pos2(x, y),
            button: PointerButton::Primary,
            pressed,
            modifiers: Modifiers::NONE,
        }
    }

    fn command_z() -> Event {
        Event::Key {
            key: Key::Z,
            physical_key: None,
            pressed: true,
            repeat: false,
            modifiers: Modifiers::COMMAND,
        }
    }

    fn ups(events: &[InputEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, InputEvent::PointerUp { .. }))
            .count()
    }

    #[test]
    fn test_location_is_canvas_local() {
        let handler = InputHandler::new(Rect::from_min_size(pos2(100.0, 50.0), vec2(200.0, 100.0)), 1.0);
        let location = handler.make_location(pos2(110.0, 60.0));
        assert_eq!(location.position, pos2(10.0, 10.0));
        assert!(location.is_in_canvas);

        let outside = handler.make_location(pos2(10.0, 10.0));
        assert!(!outside.is_in_canvas);
    }

    #[test]
    fn test_location_scales_to_device_pixels() {
        let handler = InputHandler::new(Rect::from_min_size(pos2(20.0, 20.0), vec2(100.0, 100.0)), 2.0);
        let location = handler.make_location(pos2(30.0, 25.0));
        assert_eq!(location.position, pos2(20.0, 10.0));
    }

    #[test]
    fn test_mouse_drag_commits_stroke() {
        let mut h = Harness::new();
        h.frame(vec![moved(10.0, 10.0), primary(10.0, 10.0, true)]);
        h.frame(vec![moved(50.0, 50.0)]);
        h.frame(vec![moved(90.0, 50.0)]);
        assert!(h.controller.canvas().is_drawing());

        let events = h.frame(vec![primary(90.0, 50.0, false)]);
        assert_eq!(ups(&events), 1);
        assert_eq!(h.committed(), 1);
        assert!(!h.controller.canvas().is_drawing());
        assert_eq!(h.controller.canvas().committed()[0].points().len(), 3);
    }

    #[test]
    fn test_touch_release_with_pointer_gone_commits_stroke() {
        let mut h = Harness::new();
        h.frame(vec![moved(10.0, 10.0), primary(10.0, 10.0, true)]);
        h.frame(vec![moved(50.0, 50.0)]);
        // Finger lifted: the release and the pointer leaving arrive together
        let events = h.frame(vec![primary(50.0, 50.0, false), Event::PointerGone]);
        assert_eq!(ups(&events), 1);
        h.frame(vec![]);

        assert_eq!(h.committed(), 1);
        assert!(!h.controller.canvas().is_drawing());
    }

    #[test]
    fn test_pointer_gone_without_release_ends_stroke() {
        let mut h = Harness::new();
        h.frame(vec![moved(10.0, 10.0), primary(10.0, 10.0, true)]);
        h.frame(vec![moved(40.0, 40.0)]);

        let events = h.frame(vec![Event::PointerGone]);
        assert_eq!(ups(&events), 1);
        assert_eq!(h.committed(), 1);
        assert!(!h.controller.canvas().is_drawing());

        // Coming back does not resume or duplicate the stroke
        h.frame(vec![moved(60.0, 60.0)]);
        let events = h.frame(vec![primary(60.0, 60.0, false)]);
        assert_eq!(ups(&events), 0);
        assert_eq!(h.committed(), 1);
    }

    #[test]
    fn test_tap_within_one_frame_commits_dot() {
        let mut h = Harness::new();
        let events = h.frame(vec![
            moved(20.0, 30.0),
            primary(20.0, 30.0, true),
            primary(20.0, 30.0, false),
        ]);
        assert!(matches!(events.as_slice(), [
            InputEvent::PointerMove { .. },
            InputEvent::PointerDown { .. },
            InputEvent::PointerUp { .. }
        ]));
        assert_eq!(h.committed(), 1);
        assert_eq!(h.controller.canvas().committed()[0].points(), &[pos2(20.0, 30.0)]);
    }

    #[test]
    fn test_press_outside_canvas_draws_nothing() {
        let mut h = Harness::new();
        h.frame(vec![moved(250.0, 10.0), primary(250.0, 10.0, true)]);
        h.frame(vec![moved(100.0, 10.0)]);
        h.frame(vec![primary(100.0, 10.0, false)]);
        assert_eq!(h.committed(), 0);
    }

    #[test]
    fn test_undo_shortcut_skipped_while_text_field_focused() {
        let mut h = Harness::new();
        h.frame(vec![moved(10.0, 10.0), primary(10.0, 10.0, true)]);
        h.frame(vec![primary(10.0, 10.0, false)]);
        assert_eq!(h.committed(), 1);

        let field = Id::new("color_input");
        let events = h.frame_with(vec![command_z()], |ctx| {
            ctx.memory_mut(|m| m.request_focus(field));
        });
        assert!(events.iter().all(|e| !matches!(e, InputEvent::KeyDown { .. })));
        assert_eq!(h.committed(), 1);

        h.frame_with(vec![command_z()], |ctx| {
            ctx.memory_mut(|m| m.surrender_focus(field));
        });
        assert_eq!(h.committed(), 0);
    }
}
