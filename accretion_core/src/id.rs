// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Identity handles for layers, groups, coordinators, and surfaces.

use core::fmt;

/// A handle to a single (atomic) layer registered in a
/// [`Roster`](crate::roster::Roster).
///
/// Handles are minted by [`Roster::stamp_layer`](crate::roster::Roster::stamp_layer)
/// and stay valid for the life of the roster.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerId(pub(crate) u64);

impl LayerId {
    /// Returns the raw handle value (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LayerId({})", self.0)
    }
}

/// A handle to a layer group registered in a
/// [`Roster`](crate::roster::Roster).
///
/// Minted by [`Roster::stamp_group`](crate::roster::Roster::stamp_group), or by
/// [`Roster::reserve_group_id`](crate::roster::Roster::reserve_group_id) for
/// containers that keep their own child registry (see
/// [`BypassGroup`](crate::bypass::BypassGroup)).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupId(pub(crate) u64);

impl GroupId {
    /// Returns the raw handle value (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GroupId({})", self.0)
    }
}

/// Identifies a coordinator in a [`Switchboard`](crate::switchboard::Switchboard).
///
/// Assigned by [`Switchboard::add_coordinator`](crate::switchboard::Switchboard::add_coordinator);
/// the switchboard passes these through without interpreting the value.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CoordId(pub u32);

impl fmt::Debug for CoordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CoordId({})", self.0)
    }
}

/// Identifies a map surface in a [`Switchboard`](crate::switchboard::Switchboard).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SurfaceId(pub u32);

impl fmt::Debug for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SurfaceId({})", self.0)
    }
}

/// Either a single layer or a layer group.
///
/// Every public add/remove operation accepts members, and classification
/// recursively separates them: a group contributes itself *and* its children,
/// each child landing in whichever category it belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Member {
    /// An atomic layer.
    Single(LayerId),
    /// A layer group (possibly nesting further groups).
    Group(GroupId),
}

impl From<LayerId> for Member {
    fn from(id: LayerId) -> Self {
        Self::Single(id)
    }
}

impl From<GroupId> for Member {
    fn from(id: GroupId) -> Self {
        Self::Group(id)
    }
}

#[cfg(test)]
mod tests {
    use alloc::format;

    use super::*;

    #[test]
    fn debug_formats_are_compact() {
        assert_eq!(format!("{:?}", LayerId(7)), "LayerId(7)");
        assert_eq!(format!("{:?}", GroupId(3)), "GroupId(3)");
        assert_eq!(format!("{:?}", CoordId(0)), "CoordId(0)");
        assert_eq!(format!("{:?}", SurfaceId(1)), "SurfaceId(1)");
    }

    #[test]
    fn member_from_ids() {
        assert_eq!(Member::from(LayerId(2)), Member::Single(LayerId(2)));
        assert_eq!(Member::from(GroupId(9)), Member::Group(GroupId(9)));
    }
}
