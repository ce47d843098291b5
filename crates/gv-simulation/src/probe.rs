use gv_core::math::perpendiculars;
use gv_core::{Block, BlockPos, BlockSource, EntitySnapshot, RegionId, Vec3};

/// Blocks between an entity's feet and the block above its head.
const HEAD_CLEARANCE: i32 = 2;

/// Reads blocks at offsets relative to an entity's feet.
pub struct EnvironmentProbe<'a, B: BlockSource + ?Sized> {
    blocks: &'a B,
    region: &'a RegionId,
    feet: BlockPos,
}

impl<'a, B: BlockSource + ?Sized> EnvironmentProbe<'a, B> {
    /// Probe around the entity described by `snapshot`.
    pub fn new(blocks: &'a B, snapshot: &'a EntitySnapshot) -> Self {
        Self {
            blocks,
            region: &snapshot.region,
            feet: BlockPos::containing(snapshot.location),
        }
    }

    /// The block directly below the feet.
    pub fn below(&self) -> Block {
        self.at(self.feet.offset(0, -1, 0))
    }

    /// The block directly above the head.
    pub fn above(&self) -> Block {
        self.at(self.feet.offset(0, HEAD_CLEARANCE, 0))
    }

    /// The block next to the feet in `direction`.
    pub fn ahead(&self, direction: Vec3) -> Block {
        self.at(self.feet.step_towards(direction))
    }

    /// The blocks immediately left and right of the feet, relative to `direction`.
    pub fn sides(&self, direction: Vec3) -> (Block, Block) {
        let (left, right) = perpendiculars(direction);
        (
            self.at(self.feet.step_towards(left)),
            self.at(self.feet.step_towards(right)),
        )
    }

    /// Return `true` if something solid is above the head.
    pub fn blocked_above(&self) -> bool {
        !self.above().is_air()
    }

    /// Return `true` if something solid is in the way of `direction`.
    pub fn blocked_ahead(&self, direction: Vec3) -> bool {
        !direction.horizontal().is_zero() && !self.ahead(direction).is_air()
    }

    /// Return `true` if any of ahead, left, or right is solid.
    pub fn hemmed_in(&self, direction: Vec3) -> bool {
        if direction.horizontal().is_zero() {
            return false;
        }
        let (left, right) = self.sides(direction);
        self.blocked_ahead(direction) || !left.is_air() || !right.is_air()
    }

    fn at(&self, pos: BlockPos) -> Block {
        self.blocks.block_at(self.region, pos)
    }
}
