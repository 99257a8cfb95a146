//! Collision Layers Constants
//!
//! Битовые маски слоёв. Каждая фракция получает свой слой персонажей,
//! "вражеская" маска стрелка = все слои персонажей кроме его собственного.
//!
//! ## Layers:
//! - bit 0: Reserved
//! - bit 1: BlockBullets (стены, двери — пуля останавливается)
//! - bit 2: DecalZone (зоны, где рисуются пулевые отверстия)
//! - bit 8..24: Characters (по фракции)

/// Стены и прочее, что останавливает пулю
pub const LAYER_BLOCK_BULLETS: u32 = 1 << 1;

/// Зоны декалей (пулевые отверстия на стенах)
pub const LAYER_DECAL_ZONE: u32 = 1 << 2;

const CHARACTER_LAYER_SHIFT: u32 = 8;
const CHARACTER_LAYER_COUNT: u64 = 16;

/// Все слои персонажей
pub const ALL_CHARACTER_LAYERS: u32 = 0xFFFF << CHARACTER_LAYER_SHIFT;

/// Слой персонажей фракции (фракции > 15 делят слои по модулю)
pub fn faction_layer(faction_id: u64) -> u32 {
    1 << (CHARACTER_LAYER_SHIFT + (faction_id % CHARACTER_LAYER_COUNT) as u32)
}

/// По кому стреляет фракция
pub fn enemy_mask(faction_id: u64) -> u32 {
    ALL_CHARACTER_LAYERS & !faction_layer(faction_id)
}

/// Маска line-of-sight raycast'а AI: персонажи + стены
pub const LINE_OF_SIGHT_MASK: u32 = ALL_CHARACTER_LAYERS | LAYER_BLOCK_BULLETS;
