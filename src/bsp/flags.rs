use bitflags::bitflags;

bitflags! {
    /// Leaf content flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ContentFlags: u32 {
        /// an eye is never valid in a solid
        const SOLID = 0x1;
        /// translucent, but not watery
        const WINDOW = 0x2;
        const WATER = 0x20;
        const ACTORCLIP = 0x10000;
        /// only used in the compiler
        const PASSABLE = 0x20000;
        /// removed before bsping an entity
        const ORIGIN = 0x1000000;
        const WEAPONCLIP = 0x2000000;
        const DEADMONSTER = 0x4000000;
        const DETAIL = 0x8000000;
        const TRANSLUCENT = 0x10000000;
        const STEPON = 0x40000000;
    }
}

bitflags! {
    /// Texinfo surface flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SurfaceFlags: u32 {
        /// value holds the light strength
        const LIGHT = 0x1;
        const SLICK = 0x2;
        /// turbulent water warp, never lightmapped
        const WARP = 0x8;
        const TRANS33 = 0x10;
        const TRANS66 = 0x20;
        const FLOWING = 0x40;
        const NODRAW = 0x80;
        const HINT = 0x100;
        const SKIP = 0x200;
        /// per-vertex normals for lighting
        const PHONG = 0x400;
        const ALPHATEST = 0x2000000;
    }
}

impl ContentFlags {
    /// Whether a leaf with these contents stops light.
    #[inline]
    pub fn blocks_light(self) -> bool {
        self.contains(ContentFlags::SOLID) && !self.contains(ContentFlags::PASSABLE)
    }
}
