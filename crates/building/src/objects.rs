//! Object descriptors and the store of placed objects.

use std::collections::BTreeMap;

use bevy::math::Vec3;
use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::cell::SlotAddress;
use crate::coords::{CellCoord, CellRect, Corner, Direction};

/// Occupancy category. Two objects of the same category cannot share a slot.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Encode, Decode,
)]
pub struct Category(pub String);

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Category {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Handle to a placed object. Ids are never reused within a session.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Encode,
    Decode,
)]
pub struct ObjectId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topology {
    Filling,
    Edge,
    Corner,
    Free,
}

/// A visual variant of an object with its selection weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrefabVariant {
    pub name: String,
    pub weight: f32,
}

impl PrefabVariant {
    pub fn new(name: impl Into<String>, weight: f32) -> Self {
        Self {
            name: name.into(),
            weight,
        }
    }
}

/// Which area policy providers an object responds to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AreaPolicyFlags {
    pub basic_enabler: bool,
    pub scoped_enabler: bool,
    pub basic_disabler: bool,
    pub scoped_disabler: bool,
}

impl AreaPolicyFlags {
    pub const ALL: AreaPolicyFlags = AreaPolicyFlags {
        basic_enabler: true,
        scoped_enabler: true,
        basic_disabler: true,
        scoped_disabler: true,
    };
}

fn default_size() -> (u32, u32) {
    (1, 1)
}

/// Static description of a placeable object, loadable from JSON catalogs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectDescriptor {
    pub name: String,
    pub category: Category,
    /// Footprint of cell-filling objects as (cells along X, cells along Z)
    /// when facing north. Ignored by the other topologies.
    #[serde(default = "default_size")]
    pub size: (u32, u32),
    /// Whether another object of the same category may destroy and replace this one.
    #[serde(default)]
    pub replaceable: bool,
    #[serde(default)]
    pub area_policies: AreaPolicyFlags,
    #[serde(default)]
    pub variants: Vec<PrefabVariant>,
}

impl ObjectDescriptor {
    /// A 1×1, non-replaceable descriptor with a single variant named after it.
    pub fn new(name: impl Into<String>, category: impl Into<Category>) -> Self {
        let name = name.into();
        Self {
            variants: vec![PrefabVariant::new(name.clone(), 1.0)],
            name,
            category: category.into(),
            size: default_size(),
            replaceable: false,
            area_policies: AreaPolicyFlags::default(),
        }
    }

    pub fn with_size(mut self, x: u32, z: u32) -> Self {
        self.size = (x.max(1), z.max(1));
        self
    }

    pub fn replaceable(mut self) -> Self {
        self.replaceable = true;
        self
    }

    pub fn with_area_policies(mut self, flags: AreaPolicyFlags) -> Self {
        self.area_policies = flags;
        self
    }

    pub fn with_variants(mut self, variants: Vec<PrefabVariant>) -> Self {
        self.variants = variants;
        self
    }

    /// Load a list of descriptors from a JSON array.
    pub fn catalog_from_json(text: &str) -> Result<Vec<Self>, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Footprint size as (cells along X, cells along Z) for `direction`.
    /// East/West facings swap the axes.
    pub fn rotated_size(&self, direction: Direction) -> (u32, u32) {
        if direction.is_north_south() {
            self.size
        } else {
            (self.size.1, self.size.0)
        }
    }

    /// Cells covered by a cell-filling placement anchored at `origin`.
    ///
    /// Cells are listed column by column (x ascending), rows within a column
    /// (z ascending).
    pub fn footprint(&self, origin: CellCoord, direction: Direction) -> Vec<CellCoord> {
        self.footprint_within(origin, direction, &CellRect::UNBOUNDED)
    }

    /// [`ObjectDescriptor::footprint`] cut off at the north and east edges of
    /// `clip`. An origin outside `clip` comes back alone.
    pub fn footprint_within(
        &self,
        origin: CellCoord,
        direction: Direction,
        clip: &CellRect,
    ) -> Vec<CellCoord> {
        if !clip.contains(origin) {
            return vec![origin];
        }
        let (sx, sz) = self.rotated_size(direction);
        // Last covered coordinate, widened so huge sizes cannot overflow.
        let last = |start: i32, size: u32, hi: i32| -> i32 {
            let end = i64::from(start) + i64::from(size.max(1)) - 1;
            end.min(i64::from(hi)) as i32
        };
        let last_x = last(origin.x, sx, clip.max_x);
        let last_z = last(origin.z, sz, clip.max_z);
        let mut cells = Vec::new();
        for x in origin.x..=last_x {
            for z in origin.z..=last_z {
                cells.push(CellCoord::new(x, z));
            }
        }
        cells
    }
}

/// A placed object and the slots it occupies.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedObject {
    pub id: ObjectId,
    pub descriptor: ObjectDescriptor,
    pub topology: Topology,
    pub variant: String,
    pub layer: usize,
    pub origin: CellCoord,
    pub direction: Direction,
    pub corner: Option<Corner>,
    pub flipped: bool,
    pub world_position: Vec3,
    /// Every slot holding a reference to this object, mirrored slots included.
    pub footprint: Vec<SlotAddress>,
    pub alive: bool,
}

impl PlacedObject {
    pub fn category(&self) -> &Category {
        &self.descriptor.category
    }
}

/// All objects created during the session, dead ones included.
///
/// Destroyed objects stay in the store so an undo can revive them under the
/// same id.
#[derive(Debug, Clone, Default)]
pub struct ObjectStore {
    objects: BTreeMap<ObjectId, PlacedObject>,
    next_id: u64,
}

impl ObjectStore {
    pub fn allocate_id(&mut self) -> ObjectId {
        self.next_id += 1;
        ObjectId(self.next_id)
    }

    /// Insert or overwrite the record for `object.id`.
    pub fn insert(&mut self, object: PlacedObject) {
        self.objects.insert(object.id, object);
    }

    pub fn get(&self, id: ObjectId) -> Option<&PlacedObject> {
        self.objects.get(&id)
    }

    pub fn is_alive(&self, id: ObjectId) -> bool {
        self.objects.get(&id).is_some_and(|o| o.alive)
    }

    /// Returns `false` when the id is unknown.
    pub fn set_alive(&mut self, id: ObjectId, alive: bool) -> bool {
        match self.objects.get_mut(&id) {
            Some(object) => {
                object.alive = alive;
                true
            }
            None => false,
        }
    }

    pub fn live_objects(&self) -> impl Iterator<Item = &PlacedObject> {
        self.objects.values().filter(|o| o.alive)
    }

    pub fn live_count(&self) -> usize {
        self.live_objects().count()
    }
}
