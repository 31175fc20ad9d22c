// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Map surfaces: the host-glue contract and the add/remove switch.
//!
//! A surface wraps a [`SurfaceHost`] — the platform side that actually shows
//! and hides members — together with the attachment registry and a `switched`
//! flag. Two entry points exist per surface:
//!
//! - The **original** entry points ([`Switchboard::original_attach`] /
//!   [`Switchboard::original_detach`](crate::switchboard::Switchboard::original_detach))
//!   mutate the attachment registry and drive the host directly. Bypassing
//!   containers and coordinator internals use these.
//! - The **public** entry points ([`Switchboard::surface_add`] /
//!   [`Switchboard::surface_remove`]) are what applications call. On a
//!   switched surface, a single layer owned by a coordinator is redirected
//!   into that coordinator's clustering container instead of becoming a
//!   direct child; everything else falls through to the original entry
//!   points.
//!
//! The switch is installed the first time any coordinator attaches to the
//! surface and stays for the surface's lifetime. An unswitched surface's
//! public entry points are the original ones.
//!
//! Attaching a group walks its children back through the public entry points,
//! so owned children land in their coordinator's cluster while the rest
//! become direct children. Detaching mirrors this.
//!
//! [`Switchboard::original_attach`]: crate::switchboard::Switchboard::original_attach
//! [`Switchboard::surface_add`]: crate::switchboard::Switchboard::surface_add
//! [`Switchboard::surface_remove`]: crate::switchboard::Switchboard::surface_remove

use alloc::boxed::Box;
use core::fmt;

use crate::id::{LayerId, Member, SurfaceId};
use crate::roster::Roster;
use crate::switchboard::Switchboard;

/// Applies attachment changes to a platform-native map.
///
/// Implementations render: a member attached through a surface's original
/// entry points becomes visible, a detached member disappears. Both real map
/// bindings and test doubles implement this trait.
pub trait SurfaceHost {
    /// Shows `member` on the map.
    fn attach(&mut self, member: Member);

    /// Hides `member`.
    fn detach(&mut self, member: Member);
}

/// A registered map surface: host glue plus the switch flag.
pub(crate) struct Surface {
    pub(crate) host: Box<dyn SurfaceHost>,
    pub(crate) switched: bool,
}

impl Surface {
    pub(crate) fn new(host: Box<dyn SurfaceHost>) -> Self {
        Self {
            host,
            switched: false,
        }
    }
}

impl fmt::Debug for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Surface")
            .field("switched", &self.switched)
            .finish_non_exhaustive()
    }
}

/// Attaches a single layer as a direct child of `surface`.
///
/// No-op if already attached there. A layer attached to a different surface
/// is detached from it first, keeping the attachment registry single-valued.
pub(crate) fn attach_single(
    roster: &mut Roster,
    surfaces: &mut [Surface],
    surface: SurfaceId,
    layer: LayerId,
) {
    match roster.layer_surface(layer) {
        Some(s) if s == surface => return,
        Some(other) => surfaces[other.0 as usize].host.detach(Member::Single(layer)),
        None => {}
    }
    roster.set_layer_surface(layer, Some(surface));
    surfaces[surface.0 as usize].host.attach(Member::Single(layer));
}

/// Detaches a single layer from `surface`. No-op unless attached there.
pub(crate) fn detach_single(
    roster: &mut Roster,
    surfaces: &mut [Surface],
    surface: SurfaceId,
    layer: LayerId,
) {
    if roster.layer_surface(layer) != Some(surface) {
        return;
    }
    roster.set_layer_surface(layer, None);
    surfaces[surface.0 as usize].host.detach(Member::Single(layer));
}

impl Switchboard {
    /// Adds `member` to `surface` through the public (switched) path.
    ///
    /// On a switched surface, a single layer owned by a coordinator goes into
    /// that coordinator's clustering container; everything else attaches as a
    /// direct child, groups recursing into their children through this same
    /// path.
    ///
    /// # Panics
    ///
    /// Panics if the surface or member id is unknown.
    pub fn surface_add(&mut self, surface: SurfaceId, member: Member) -> &mut Self {
        self.validate_surface(surface);
        if self.surfaces[surface.0 as usize].switched
            && let Member::Single(layer) = member
            && let Some(owner) = self.roster.owner_of(layer)
        {
            self.cluster_add_singles(owner, &[layer]);
            return self;
        }
        self.original_attach(surface, member);
        self
    }

    /// Removes `member` from `surface` through the public (switched) path.
    ///
    /// Mirror of [`surface_add`](Self::surface_add): an owned single layer is
    /// removed from its coordinator's clustering container (ownership is
    /// retained), everything else detaches directly.
    ///
    /// # Panics
    ///
    /// Panics if the surface or member id is unknown.
    pub fn surface_remove(&mut self, surface: SurfaceId, member: Member) -> &mut Self {
        self.validate_surface(surface);
        if self.surfaces[surface.0 as usize].switched
            && let Member::Single(layer) = member
            && let Some(owner) = self.roster.owner_of(layer)
        {
            self.cluster_remove_singles(owner, &[layer]);
            return self;
        }
        self.original_detach(surface, member);
        self
    }

    /// The original attach entry point: registers the attachment and drives
    /// the host, bypassing the switch for `member` itself. A group's children
    /// re-enter through [`surface_add`](Self::surface_add).
    ///
    /// No-op if `member` is already attached to `surface`.
    pub(crate) fn original_attach(&mut self, surface: SurfaceId, member: Member) {
        match member {
            Member::Single(layer) => {
                attach_single(&mut self.roster, &mut self.surfaces, surface, layer);
            }
            Member::Group(group) => {
                match self.roster.group_surface(group) {
                    Some(s) if s == surface => return,
                    Some(other) => self.original_detach(other, member),
                    None => {}
                }
                self.roster.set_group_surface(group, Some(surface));
                self.surfaces[surface.0 as usize].host.attach(member);
                let children = self.roster.group_children(group).to_vec();
                for child in children {
                    self.surface_add(surface, child);
                }
            }
        }
    }

    /// The original detach entry point. No-op unless `member` is attached to
    /// `surface`. A group's children re-enter through
    /// [`surface_remove`](Self::surface_remove).
    pub(crate) fn original_detach(&mut self, surface: SurfaceId, member: Member) {
        match member {
            Member::Single(layer) => {
                detach_single(&mut self.roster, &mut self.surfaces, surface, layer);
            }
            Member::Group(group) => {
                if self.roster.group_surface(group) != Some(surface) {
                    return;
                }
                let children = self.roster.group_children(group).to_vec();
                for child in children {
                    self.surface_remove(surface, child);
                }
                self.roster.set_group_surface(group, None);
                self.surfaces[surface.0 as usize].host.detach(member);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::vec;

    use super::*;

    struct NullHost;

    impl SurfaceHost for NullHost {
        fn attach(&mut self, _member: Member) {}
        fn detach(&mut self, _member: Member) {}
    }

    #[test]
    fn attach_single_is_idempotent() {
        let mut roster = Roster::new();
        let mut surfaces = vec![Surface::new(Box::new(NullHost))];
        let l = roster.stamp_layer();

        attach_single(&mut roster, &mut surfaces, SurfaceId(0), l);
        attach_single(&mut roster, &mut surfaces, SurfaceId(0), l);
        assert_eq!(roster.layer_surface(l), Some(SurfaceId(0)));
    }

    #[test]
    fn reattach_moves_between_surfaces() {
        let mut roster = Roster::new();
        let mut surfaces = vec![
            Surface::new(Box::new(NullHost)),
            Surface::new(Box::new(NullHost)),
        ];
        let l = roster.stamp_layer();

        attach_single(&mut roster, &mut surfaces, SurfaceId(0), l);
        attach_single(&mut roster, &mut surfaces, SurfaceId(1), l);
        assert_eq!(roster.layer_surface(l), Some(SurfaceId(1)));

        detach_single(&mut roster, &mut surfaces, SurfaceId(0), l);
        assert_eq!(
            roster.layer_surface(l),
            Some(SurfaceId(1)),
            "no-op on the wrong surface"
        );
        detach_single(&mut roster, &mut surfaces, SurfaceId(1), l);
        assert_eq!(roster.layer_surface(l), None);
    }
}
