//! Named spatial anchors inside a puzzle.

use std::sync::atomic::{AtomicBool, Ordering};

use dungeon_puzzle_core::{Item, Placement, SpawnPosition};
use glam::IVec2;
use rand::Rng;

/// Fraction of each extent kept free between fixed spawn points and the walls.
const CORNER_INSET_DIVISOR: i32 = 10;

#[derive(Debug)]
struct Lock {
    key: Item,
    locked: AtomicBool,
}

/// Rectangular area of a puzzle, optionally a lock that requires a key.
#[derive(Debug)]
pub struct PuzzlePlace {
    name: String,
    anchor: IVec2,
    extent: IVec2,
    lock: Option<Lock>,
}

impl PuzzlePlace {
    /// Creates a plain place whose south-west corner sits at `anchor` in world space.
    ///
    /// Negative extents are clamped to zero.
    #[must_use]
    pub fn new(name: impl Into<String>, anchor: IVec2, extent: IVec2) -> Self {
        Self {
            name: name.into(),
            anchor,
            extent: extent.max(IVec2::ZERO),
            lock: None,
        }
    }

    /// Creates a locked place that opens with `key`.
    #[must_use]
    pub fn new_lock(name: impl Into<String>, anchor: IVec2, extent: IVec2, key: Item) -> Self {
        Self {
            lock: Some(Lock {
                key,
                locked: AtomicBool::new(true),
            }),
            ..Self::new(name, anchor, extent)
        }
    }

    /// Name of the place.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// World coordinate of the place's origin.
    #[must_use]
    pub const fn world_anchor(&self) -> IVec2 {
        self.anchor
    }

    /// Width and height of the place.
    #[must_use]
    pub const fn extent(&self) -> IVec2 {
        self.extent
    }

    /// Reports whether the place is a lock.
    #[must_use]
    pub fn is_lock(&self) -> bool {
        self.lock.is_some()
    }

    /// Key opening the lock, `None` for plain places.
    #[must_use]
    pub fn key(&self) -> Option<&Item> {
        self.lock.as_ref().map(|lock| &lock.key)
    }

    /// Reports whether the place is a lock that is still closed.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.lock
            .as_ref()
            .is_some_and(|lock| lock.locked.load(Ordering::Acquire))
    }

    /// Opens the lock. Returns `true` only for the call that opened it.
    pub fn unlock(&self) -> bool {
        self.lock
            .as_ref()
            .is_some_and(|lock| lock.locked.swap(false, Ordering::AcqRel))
    }

    /// Picks a spawn position relative to the world anchor.
    ///
    /// `Random` draws a point inside the inset area and a random facing from
    /// `rng`. Fixed placements never consume randomness; corners face the
    /// center of the place.
    pub fn position<R: Rng>(&self, placement: Placement, rng: &mut R) -> SpawnPosition {
        let inset = self.extent / CORNER_INSET_DIVISOR;
        let low = inset;
        let high = self.extent - inset;
        let center = self.extent / 2;

        let point = match placement {
            Placement::Random => {
                let x = rng.gen_range(low.x..=high.x);
                let y = rng.gen_range(low.y..=high.y);
                let degrees = rng.gen_range(0..360);
                return SpawnPosition { x, y, degrees };
            }
            Placement::Center => center,
            Placement::Corner1 => IVec2::new(low.x, low.y),
            Placement::Corner2 => IVec2::new(high.x, low.y),
            Placement::Corner3 => IVec2::new(high.x, high.y),
            Placement::Corner4 => IVec2::new(low.x, high.y),
        };

        SpawnPosition {
            x: point.x,
            y: point.y,
            degrees: facing(point, center),
        }
    }
}

/// Degrees from `from` toward `to`, counter-clockwise from the positive x axis.
fn facing(from: IVec2, to: IVec2) -> u16 {
    let delta = (to - from).as_vec2();
    if delta == glam::Vec2::ZERO {
        return 0;
    }
    let degrees = delta.y.atan2(delta.x).to_degrees().rem_euclid(360.0);
    (degrees.round() as u16) % 360
}

#[cfg(test)]
mod tests {
    use super::*;
    use dungeon_puzzle_core::ItemId;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn room() -> PuzzlePlace {
        PuzzlePlace::new("room", IVec2::new(1_000, 2_000), IVec2::new(600, 400))
    }

    #[test]
    fn random_positions_stay_inside_inset_area() {
        let place = room();
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        for _ in 0..200 {
            let position = place.position(Placement::Random, &mut rng);
            assert!((60..=540).contains(&position.x), "x out of range: {position:?}");
            assert!((40..=360).contains(&position.y), "y out of range: {position:?}");
            assert!(position.degrees < 360);
        }
    }

    #[test]
    fn corners_face_the_center() {
        let place = room();
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let south_west = place.position(Placement::Corner1, &mut rng);
        assert_eq!((south_west.x, south_west.y), (60, 40));
        assert!(south_west.degrees > 0 && south_west.degrees < 90);

        let north_east = place.position(Placement::Corner3, &mut rng);
        assert_eq!((north_east.x, north_east.y), (540, 360));
        assert!(north_east.degrees > 180 && north_east.degrees < 270);

        let center = place.position(Placement::Center, &mut rng);
        assert_eq!((center.x, center.y, center.degrees), (300, 200, 0));
    }

    #[test]
    fn empty_place_always_yields_origin() {
        let place = PuzzlePlace::new("closet", IVec2::ZERO, IVec2::new(-5, 0));
        assert_eq!(place.extent(), IVec2::ZERO);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let position = place.position(Placement::Random, &mut rng);
        assert_eq!((position.x, position.y), (0, 0));
    }

    #[test]
    fn locks_open_once() {
        let key = Item::new(ItemId::new(70_028), "Boss Room Key");
        let door = PuzzlePlace::new_lock("door", IVec2::ZERO, IVec2::new(10, 10), key.clone());

        assert!(door.is_lock());
        assert_eq!(door.key(), Some(&key));
        assert!(door.is_locked());
        assert!(door.unlock());
        assert!(!door.unlock());
        assert!(!door.is_locked());

        let plain = room();
        assert!(!plain.is_lock());
        assert!(plain.key().is_none());
        assert!(!plain.unlock());
    }
}
