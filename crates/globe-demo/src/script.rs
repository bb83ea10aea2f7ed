//! Scripted pointer input standing in for a real pointer device.

use glam::Vec2;
use globe_orientation::PointerEvent;

/// Pointer events keyed by the frame on which they fire.
#[derive(Clone, Debug, Default)]
pub struct PointerScript {
    events: Vec<(u32, PointerEvent)>,
}

impl PointerScript {
    /// A horizontal flick: press at `start_frame`, drag `distance` pixels to
    /// the right over `steps` frames, then release.
    pub fn flick(start_frame: u32, distance: f32, steps: u32) -> Self {
        let steps = steps.max(1);
        let mut events = vec![(start_frame, PointerEvent::Down(Vec2::ZERO))];
        for i in 1..=steps {
            let x = distance * i as f32 / steps as f32;
            events.push((start_frame + i, PointerEvent::Move(Vec2::new(x, 0.0))));
        }
        events.push((start_frame + steps + 1, PointerEvent::Up));
        Self { events }
    }

    /// Events that fire on `frame`, in order.
    pub fn events_at(&self, frame: u32) -> impl Iterator<Item = PointerEvent> + '_ {
        self.events
            .iter()
            .filter(move |(at, _)| *at == frame)
            .map(|(_, event)| *event)
    }

    /// Frame of the last scripted event.
    pub fn last_frame(&self) -> Option<u32> {
        self.events.iter().map(|(at, _)| *at).max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flick_shape() {
        let script = PointerScript::flick(10, 100.0, 4);
        assert_eq!(
            script.events_at(10).collect::<Vec<_>>(),
            vec![PointerEvent::Down(Vec2::ZERO)]
        );
        assert_eq!(
            script.events_at(14).collect::<Vec<_>>(),
            vec![PointerEvent::Move(Vec2::new(100.0, 0.0))]
        );
        assert_eq!(
            script.events_at(15).collect::<Vec<_>>(),
            vec![PointerEvent::Up]
        );
        assert_eq!(script.last_frame(), Some(15));
        assert_eq!(script.events_at(3).count(), 0);
    }

    #[test]
    fn test_empty_script() {
        let script = PointerScript::default();
        assert_eq!(script.last_frame(), None);
        assert_eq!(script.events_at(0).count(), 0);
    }
}
