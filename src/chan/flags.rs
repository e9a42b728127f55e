use bitflags::bitflags;

bitflags! {
    /// Mismatches tolerated when an animation is bound to a part hierarchy.
    ///
    /// The empty set accepts only an exact match.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct HierarchyMatchFlags: u8 {
        /// The part hierarchy may have nodes the animation lacks.
        const OK_PART_EXTRA = 0x01;
        /// The animation may have nodes the part hierarchy lacks.
        const OK_ANIM_EXTRA = 0x02;
        /// The root names may differ.
        const OK_WRONG_ROOT_NAME = 0x04;
    }
}
