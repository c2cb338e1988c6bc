//! Target game description: runtime version, capability bits and asset names.
//!
//! Every feature flag is derived from the version on each read; nothing is
//! cached between calls.

mod version;

use std::borrow::Cow;

use anyhow::Result;
use gml_decompiler::{interface, AssetType};

pub use version::{GmVersion, LtsBranch};

use crate::error::{narrow, FfiError, FfiResult};
use crate::primitives::{RawArray, RawStr};

/// Instance ids at or above this are placed room instances.
pub const ROOM_INSTANCE_ID_BASE: i32 = 100_000;

type NameTable<'a> = RawArray<'a, RawStr<'a>>;

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct GameContext<'a> {
    pub version: GmVersion,
    /// Bytecode format version of the data file.
    pub wad_version: u8,
    /// Raw [`LtsBranch`] tag.
    pub lts_branch: u8,
    pub short_circuit: u8,
    pub array_cow: u8,
    pub object_names: NameTable<'a>,
    pub sprite_names: NameTable<'a>,
    pub sound_names: NameTable<'a>,
    pub room_names: NameTable<'a>,
    pub background_names: NameTable<'a>,
    pub path_names: NameTable<'a>,
    pub script_names: NameTable<'a>,
    pub font_names: NameTable<'a>,
    pub timeline_names: NameTable<'a>,
    pub shader_names: NameTable<'a>,
    pub sequence_names: NameTable<'a>,
    pub animcurve_names: NameTable<'a>,
    pub particle_system_names: NameTable<'a>,
}

impl<'a> GameContext<'a> {
    /// A context with no asset names and both capability bits cleared.
    pub fn new(version: GmVersion, wad_version: u8, branch: LtsBranch) -> Self {
        Self {
            version,
            wad_version,
            lts_branch: branch as u8,
            short_circuit: 0,
            array_cow: 0,
            object_names: RawArray::EMPTY,
            sprite_names: RawArray::EMPTY,
            sound_names: RawArray::EMPTY,
            room_names: RawArray::EMPTY,
            background_names: RawArray::EMPTY,
            path_names: RawArray::EMPTY,
            script_names: RawArray::EMPTY,
            font_names: RawArray::EMPTY,
            timeline_names: RawArray::EMPTY,
            shader_names: RawArray::EMPTY,
            sequence_names: RawArray::EMPTY,
            animcurve_names: RawArray::EMPTY,
            particle_system_names: RawArray::EMPTY,
        }
    }

    pub fn branch(&self) -> FfiResult<LtsBranch> {
        narrow::<LtsBranch>("lts_branch", self.lts_branch)
            .map_err(|_| FfiError::InvalidBranch(self.lts_branch))
    }

    fn is_at_least(&self, major: u32, minor: u32) -> bool {
        self.version.at_least(major, minor, 0, 0)
    }

    /// Like [`GmVersion::at_least`], but always false on pre-2022 and LTS runtimes.
    pub fn is_at_least_non_lts(
        &self,
        major: u32,
        minor: u32,
        release: u32,
        build: u32,
    ) -> FfiResult<bool> {
        match self.branch()? {
            LtsBranch::Pre2022 | LtsBranch::Lts2022 => Ok(false),
            LtsBranch::Post2022 => Ok(self.version.at_least(major, minor, release, build)),
        }
    }

    fn names(&self, asset_type: AssetType) -> Option<&NameTable<'a>> {
        let table = match asset_type {
            AssetType::Object => &self.object_names,
            AssetType::Sprite => &self.sprite_names,
            AssetType::Sound => &self.sound_names,
            AssetType::Room => &self.room_names,
            AssetType::Background => &self.background_names,
            AssetType::Path => &self.path_names,
            AssetType::Script => &self.script_names,
            AssetType::Font => &self.font_names,
            AssetType::Timeline => &self.timeline_names,
            AssetType::Shader => &self.shader_names,
            AssetType::Sequence => &self.sequence_names,
            AssetType::AnimCurve => &self.animcurve_names,
            AssetType::ParticleSystem => &self.particle_system_names,
            AssetType::RoomInstance => return None,
        };
        Some(table)
    }
}

impl interface::GameContext for GameContext<'_> {
    fn using_gms2_or_later(&self) -> bool {
        self.is_at_least(2, 0)
    }

    fn using_gmlv2(&self) -> bool {
        self.is_at_least(2, 3)
    }

    fn using_string_real_optimizations(&self) -> bool {
        self.is_at_least(2, 0) || self.version.build == 1539 || self.version.build >= 1763
    }

    fn using_typed_booleans(&self) -> bool {
        self.version.at_least(2, 3, 7, 0)
    }

    fn using_nullish_operator(&self) -> bool {
        self.version.at_least(2, 3, 7, 0)
    }

    fn using_asset_references(&self) -> bool {
        self.is_at_least(2023, 8)
    }

    fn using_room_instance_references(&self) -> bool {
        self.is_at_least(2024, 2)
    }

    fn using_function_script_references(&self) -> bool {
        self.is_at_least(2024, 2)
    }

    fn using_new_function_resolution(&self) -> bool {
        self.is_at_least(2023, 13)
    }

    fn bytecode_14_or_lower(&self) -> bool {
        self.wad_version <= 14
    }

    fn using_logical_short_circuit(&self) -> bool {
        self.short_circuit != 0
    }

    fn using_long_compound_bitwise(&self) -> bool {
        self.version.at_least(2, 3, 2, 0)
    }

    fn using_extra_repeat_instruction(&self) -> Result<bool> {
        Ok(!self.is_at_least_non_lts(2022, 11, 0, 0)?)
    }

    fn using_finally_before_throw(&self) -> bool {
        !self.is_at_least(2024, 6)
    }

    fn using_constructor_set_static(&self) -> bool {
        self.is_at_least(2024, 11)
    }

    fn using_array_copy_on_write(&self) -> bool {
        self.array_cow != 0
    }

    fn using_new_array_owners(&self) -> bool {
        self.version.at_least(2, 3, 2, 0)
    }

    fn using_reentrant_static(&self) -> bool {
        !self.is_at_least(2024, 11)
    }

    fn using_new_function_variables(&self) -> bool {
        self.is_at_least(2024, 2)
    }

    fn using_self_to_builtin(&self) -> bool {
        self.is_at_least(2024, 2)
    }

    fn using_global_constant_function(&self) -> bool {
        self.is_at_least(2023, 11)
    }

    fn using_object_function_foresight(&self) -> bool {
        self.is_at_least(2024, 11)
    }

    fn using_better_try_break_continue(&self) -> bool {
        self.is_at_least(2024, 11)
    }

    fn using_builtin_default_arguments(&self) -> bool {
        self.is_at_least(2024, 11)
    }

    fn using_optimized_function_declarations(&self) -> bool {
        self.is_at_least(2024, 14)
    }

    fn builtins_version(&self) -> (u32, u32, u32, u32) {
        let v = self.version;
        (v.major, v.minor, v.release, v.build)
    }

    fn asset_name(&self, asset_type: AssetType, asset_index: i32) -> Result<Option<Cow<'_, str>>> {
        if asset_index < 0 {
            return Ok(None);
        }
        let Some(table) = self.names(asset_type) else {
            if asset_index < ROOM_INSTANCE_ID_BASE {
                return Ok(None);
            }
            return Ok(Some(Cow::Owned(format!("inst_{}", asset_index))));
        };

        // Index 0 never resolves to a name.
        if asset_index == 0 {
            return Ok(None);
        }
        match table.get_signed(asset_index) {
            Ok(name) => Ok(Some(Cow::Borrowed(name.content()?))),
            Err(FfiError::IndexOutOfRange { .. }) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn asset_id(&self, _asset_name: &str) -> Result<Option<i32>> {
        Err(FfiError::NotImplemented("asset_id").into())
    }

    fn room_instance_id(&self, _room_instance_name: &str) -> Result<Option<i32>> {
        Err(FfiError::NotImplemented("room_instance_id").into())
    }

    fn script_id(&self, _script_name: &str) -> Result<Option<i32>> {
        Err(FfiError::NotImplemented("script_id").into())
    }

    fn script_id_by_function_name(&self, _function_name: &str) -> Result<Option<i32>> {
        Err(FfiError::NotImplemented("script_id_by_function_name").into())
    }
}
