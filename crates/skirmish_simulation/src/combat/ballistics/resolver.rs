//! Рекурсивное разрешение сегмента пули.

use bevy::prelude::*;

use super::{SegmentRecord, ShotOutcome, ShotParams, ShotReport};
use crate::ai::AiController;
use crate::combat::events::{vector_angle, AnimationRequest, CombatFx, CombatantDied, SoundCue};
use crate::combat::{EquippedWeapon, Weapon};
use crate::combat_math::{bullet_hole_size, damage_at_distance, map_range_clamped, roll};
use crate::components::{
    Actor, AgilitySkillLevel, AnimationConstraint, AnimationGroup, AnimationState, Armour, BodyPart, BodyPartKind,
    BodyParts, CharacterBody, CharacterFlags, CombatStats, CombatWorldState, DodgeMeter, ImpactOffset, Vitality,
    WoundMarks,
};
use crate::config::{CombatConVars, MAX_SHOT_ITERATIONS};
use crate::logger;
use crate::physics::{enemy_mask, RayHit, WorldQuery, LAYER_BLOCK_BULLETS, LAYER_DECAL_ZONE};
use crate::player::{Player, PlayerKillStats};

/// На сколько вперёд щупаем "мы внутри части тела?"
const EXIT_PROBE_DISTANCE: f32 = 5.0;
const MISS_TRACER_LENGTH: f32 = 10_000.0;
const WALL_DECAL_SIZE: f32 = 50.0;
const SPLATTER_DISTANCE: f32 = 300.0;
const IMPACT_ROTATION: f32 = 3.0;
const IMPACT_PUSH: f32 = 6.0;
const PANIC_ON_HIT: f32 = 0.25;
const INNER_CUTOUT_THRESHOLD: f32 = 0.2;
const DEFLECT_SPREAD: f32 = 12.0;

// Соли бросков (разные решения одного сегмента не коррелируют)
const SALT_ARMOUR: f32 = 11.0;
const SALT_JUMP_DODGE: f32 = 23.0;
const SALT_BLOCK_IMPACT: f32 = 37.0;
const SALT_DEFLECT_SPREAD: f32 = 41.0;
const SALT_SPLATTER: f32 = 53.0;
const SALT_HEAD_ARMOUR: f32 = 67.0;
const SALT_BLOOD_SPLAT: f32 = 71.0;

/// Что resolver знает о живом/мёртвом персонаже, в которого попали
struct Victim {
    entity: Entity,
    parts: Vec<Entity>,
    faction: u64,
    alive: bool,
    is_player: bool,
    is_ai: bool,
    flags: CharacterFlags,
    dodge_oversaturate: bool,
    agility: AgilitySkillLevel,
    panic_intensity: f32,
    is_flipped: bool,
    is_blocking: bool,
    block_progress: f32,
    head_position: Vec2,
    body_center: Vec2,
    scale: f32,
    is_dodging: bool,
    weapon_can_deflect: bool,
}

struct Resolver<'w, 'q> {
    world: &'w mut World,
    query: &'q dyn WorldQuery,
    convars: CombatConVars,
    elapsed: f32,
    god_mode: bool,
    report: ShotReport,
}

/// Разрешить сегмент `shot`, пролетевший до него `accumulated_distance`
///
/// Продолжения (exit wound, dodge, deflect, проход сквозь тело) разрешаются
/// рекурсивно с `iteration + 1`; на `MAX_SHOT_ITERATIONS` цепочка обрывается.
pub fn resolve(
    world: &mut World,
    query: &dyn WorldQuery,
    shot: ShotParams,
    accumulated_distance: f32,
    iteration: u32,
) -> ShotReport {
    let convars = world.get_resource::<CombatConVars>().cloned().unwrap_or_default();
    let (elapsed, god_mode) = world
        .get_resource::<CombatWorldState>()
        .map_or((0.0, false), |state| (state.elapsed, state.god_mode));

    let mut resolver = Resolver {
        world,
        query,
        convars,
        elapsed,
        god_mode,
        report: ShotReport::default(),
    };
    resolver.segment(shot, accumulated_distance, iteration);
    resolver.report
}

impl Resolver<'_, '_> {
    fn roll(&self, shot: &ShotParams, iteration: u32, salt: f32) -> f32 {
        roll(self.elapsed, shot.seed, iteration, salt)
    }

    fn record(&mut self, shot: &ShotParams, iteration: u32, outcome: ShotOutcome) {
        self.report.segments.push(SegmentRecord {
            iteration,
            origin: shot.origin,
            direction: shot.direction,
            cosmetic: shot.is_cosmetic,
            outcome,
        });
    }

    fn segment(&mut self, shot: ShotParams, distance: f32, iteration: u32) {
        if iteration >= MAX_SHOT_ITERATIONS {
            return;
        }

        let origin = shot.origin;
        let dir = shot.direction;

        // Сейчас внутри части тела? (тогда следующее попадание по ней — выходное отверстие)
        let inside_part =
            self.query.first_containing(origin + dir * EXIT_PROBE_DISTANCE, shot.enemy_mask, &shot.ignore);
        let mut is_exit_wound = inside_part.is_some();

        let Some(hit) = self.query.raycast(origin, dir, shot.enemy_mask | LAYER_BLOCK_BULLETS, &shot.ignore) else {
            self.report.fx.push(CombatFx::Tracer { from: origin, to: origin + dir * MISS_TRACER_LENGTH });
            self.record(&shot, iteration, ShotOutcome::Missed);
            return;
        };

        self.report.fx.push(CombatFx::Tracer { from: origin, to: hit.position });
        if hit.layers & LAYER_BLOCK_BULLETS != 0 && self.query.query_point(hit.position, LAYER_DECAL_ZONE, &[]) > 0 {
            self.report.fx.push(CombatFx::BulletHole {
                position: hit.position,
                angle: vector_angle(hit.normal),
                size: WALL_DECAL_SIZE,
            });
        }
        if hit.distance < EXIT_PROBE_DISTANCE {
            is_exit_wound = false;
        }

        let total = distance + hit.distance;
        let part = self.world.get::<BodyPart>(hit.entity).copied();
        let victim = part.and_then(|p| self.victim(p.owner));

        if self.god_mode && victim.as_ref().is_some_and(|v| v.is_player) {
            self.record(&shot, iteration, ShotOutcome::Aborted);
            return;
        }

        let (Some(part), Some(victim)) = (part, victim) else {
            // Стены и всё, что не персонаж, пулю останавливают
            self.record(&shot, iteration, ShotOutcome::Blocked { entity: hit.entity });
            return;
        };

        if is_exit_wound && inside_part == Some(hit.entity) {
            self.wound(&shot, &hit, part, &victim, total, iteration, true);
            self.record(&shot, iteration, ShotOutcome::ExitWound { part: hit.entity });
            self.segment(shot.continue_from(hit.position), total, iteration + 1);
            return;
        }

        if shot.is_cosmetic {
            self.wound(&shot, &hit, part, &victim, total, iteration, is_exit_wound);
            self.record(&shot, iteration, ShotOutcome::Cosmetic { part: hit.entity });
            self.segment(shot.continue_from(hit.position), total, iteration + 1);
            return;
        }

        let mut has_dodged = false;
        if victim.alive {
            if victim.is_dodging || victim.flags.invincible {
                has_dodged = true;
                if !victim.is_player {
                    self.drain_dodge(victim.entity, self.convars.passive_dodge_drain);
                }
            }

            let mut can_dodge = self.has_dodge(victim.entity) && !victim.is_dodging;
            if can_dodge && victim.is_ai {
                self.add_panic(victim.entity, self.convars.panic_multiplier * victim.panic_intensity);
            }

            // Пуля летит в лицо жертве
            let from_front = (dir.x > 0.0) == victim.is_flipped;

            let deflecting_weapon =
                can_dodge && victim.is_blocking && victim.weapon_can_deflect && shot.can_be_deflected;
            let armour_chance = self.armour_chance(victim.entity, part.kind);
            let deflecting_armour = armour_chance > self.roll(&shot, iteration, SALT_ARMOUR);
            let will_deflect = shot.cluster_size == 1 && from_front && (deflecting_weapon || deflecting_armour);

            if will_deflect {
                if deflecting_weapon {
                    self.drain_dodge(victim.entity, self.convars.deflect_dodge_cost * shot.damage);
                }

                if self.has_dodge(victim.entity) || victim.dodge_oversaturate {
                    let perfect = deflecting_weapon && !shot.can_be_auto_dodged && victim.block_progress < 1.0;
                    if shot.can_be_auto_dodged || perfect {
                        self.deflect(shot, &hit, &victim, deflecting_weapon, deflecting_armour, perfect, total, iteration);
                        return;
                    }
                }
            } else if can_dodge {
                let mut cost = shot.damage.max(0.4) / 1.5
                    * if victim.dodge_oversaturate { 1.0 } else { shot.cluster_size.max(1) as f32 };
                if !from_front {
                    cost *= self.convars.dodge_from_behind_cost_multiplier;
                }

                if !victim.is_player {
                    let distance_sq = hit.position.distance_squared(origin);
                    let point_blank = self.convars.point_blank_distance;
                    if distance_sq < point_blank * point_blank {
                        if !victim.dodge_oversaturate {
                            cost *= self.convars.dodge_point_blank_cost_multiplier;
                        }
                    } else {
                        let near = self.convars.dodge_curve_min_distance;
                        let far = self.convars.dodge_curve_max_distance;
                        cost /= map_range_clamped(near * near, far * far, 1.0, 8.0, distance_sq);
                    }
                }

                self.drain_dodge(victim.entity, cost);

                let jump_dodge = victim.agility != AgilitySkillLevel::None
                    && !victim.is_player
                    && self.roll(&shot, iteration, SALT_JUMP_DODGE) < self.convars.jump_dodge_chance;

                can_dodge = self.has_dodge(victim.entity) || victim.dodge_oversaturate || jump_dodge;
                if can_dodge && shot.can_be_auto_dodged {
                    let group = if jump_dodge { AnimationGroup::JumpDodge } else { AnimationGroup::Dodge };
                    self.play(AnimationRequest::new(victim.entity, group));
                    if victim.is_player {
                        self.report.fx.push(CombatFx::Sound { cue: SoundCue::NearMiss, position: hit.position, volume: 1.0 });
                    }
                    has_dodged = true;
                }
            }
        }

        if has_dodged {
            self.record(&shot, iteration, ShotOutcome::Dodged { victim: victim.entity });
            let mut next = shot.continue_from(hit.position);
            next.ignore.extend(victim.parts.iter().copied());
            self.segment(next, total, iteration + 1);
            return;
        }

        if !victim.flags.responds_to_bullets {
            self.record(&shot, iteration, ShotOutcome::Blocked { entity: hit.entity });
            return;
        }

        self.damage(shot, &hit, part, &victim, total, iteration, is_exit_wound);
    }

    #[allow(clippy::too_many_arguments)]
    fn deflect(
        &mut self,
        shot: ShotParams,
        hit: &RayHit,
        victim: &Victim,
        by_weapon: bool,
        by_armour: bool,
        perfect: bool,
        total: f32,
        iteration: u32,
    ) {
        if by_weapon {
            let impact = self.roll(&shot, iteration, SALT_BLOCK_IMPACT) * 2.0 - 1.0;
            if let Some(mut body) = self.world.get_mut::<CharacterBody>(victim.entity) {
                body.melee_block_impact += impact;
            }
        }

        let direction = if perfect {
            // Наказание стрелка: dodge в минус, долго не восстанавливается
            let mut target = shot.origin;
            if let Some(attacker) = shot.origin_character {
                if let Some(mut dodge) = self.world.get_mut::<DodgeMeter>(attacker) {
                    dodge.punish(-1.0, 10.0);
                }
                if let Some(body) = self.world.get::<CharacterBody>(attacker) {
                    target = body.head_position();
                }
            }

            if let Some(mut dodge) = self.world.get_mut::<DodgeMeter>(victim.entity) {
                dodge.restore_full();
            }
            if let Some(mut body) = self.world.get_mut::<CharacterBody>(victim.entity) {
                body.melee_block_progress = 1.0;
                body.melee_block_impact += 1.0;
                body.recoil += 2.0;
            }
            if let Some(mut state) = self.world.get_resource_mut::<CombatWorldState>() {
                state.time_dilation.trigger();
            }

            self.report.fx.push(CombatFx::Sound { cue: SoundCue::PerfectDeflect, position: hit.position, volume: 1.0 });
            self.report.fx.push(CombatFx::SlowMotion { scale: crate::components::TimeDilation::SLOW_SCALE });
            logger::log(&format!("⚔️ Perfect deflect: {:?} вернул пулю стрелку {:?}", victim.entity, shot.origin_character));

            (target - hit.position).try_normalize().unwrap_or(-shot.direction)
        } else {
            self.report.fx.push(CombatFx::Sound { cue: SoundCue::BulletDeflection, position: hit.position, volume: 0.5 });

            let spread = self.roll(&shot, iteration, SALT_DEFLECT_SPREAD) * 2.0 * DEFLECT_SPREAD - DEFLECT_SPREAD;
            (shot.direction * Vec2::new(-1.0, spread)).try_normalize().unwrap_or(-shot.direction)
        };

        if by_armour && victim.alive && victim.flags.stun_on_non_fatal_attack {
            let forwards = (shot.direction.x < 0.0) == victim.is_flipped;
            self.play(AnimationRequest::stun(victim.entity, forwards));
        }

        self.report.fx.push(CombatFx::DeflectionSpark { position: hit.position, angle: vector_angle(direction) });
        self.record(&shot, iteration, ShotOutcome::Deflected { victim: victim.entity, perfect });

        let next = ShotParams {
            origin: hit.position,
            direction,
            enemy_mask: enemy_mask(victim.faction),
            ignore: victim.parts.clone(),
            origin_character: Some(victim.entity),
            can_be_auto_dodged: true,
            ..shot
        };
        self.segment(next, total, iteration + 1);
    }

    #[allow(clippy::too_many_arguments)]
    fn damage(
        &mut self,
        shot: ShotParams,
        hit: &RayHit,
        part: BodyPart,
        victim: &Victim,
        total: f32,
        iteration: u32,
        is_exit_wound: bool,
    ) {
        let dir = shot.direction;
        let falloff = damage_at_distance(shot.damage, total);

        if victim.alive && total < SPLATTER_DISTANCE && self.roll(&shot, iteration, SALT_SPLATTER) > 0.95 {
            self.report.fx.push(CombatFx::Sound { cue: SoundCue::Splatter, position: hit.position, volume: 1.0 });
        }

        if part.kind == BodyPartKind::Head && self.roll(&shot, iteration, SALT_HEAD_ARMOUR) > 0.5 {
            let broken = self
                .world
                .get_mut::<Armour>(victim.entity)
                .and_then(|mut armour| {
                    let piece = armour.head.as_mut()?;
                    piece.break_piece().then(|| piece.name.clone())
                });
            if let Some(piece) = broken {
                self.report.fx.push(CombatFx::ArmourBroken { entity: victim.entity, piece });
            }
        }

        let part_center = victim.part_center(part.kind);
        if let Some(mut offset) = self.world.get_mut::<ImpactOffset>(hit.entity) {
            let rotation = IMPACT_ROTATION * dir.x.signum();
            offset.rotation += if hit.position.y > part_center.y { -rotation } else { rotation };
            offset.translation += dir * IMPACT_PUSH;
        }

        if !victim.alive {
            self.report.fx.push(CombatFx::RagdollImpulse { part: hit.entity, impulse: dir * shot.damage });
        }

        let splat_roll = self.roll(&shot, iteration, SALT_BLOOD_SPLAT);
        if splat_roll > 0.7 {
            self.report.fx.push(CombatFx::BloodSplat {
                position: hit.position,
                angle: vector_angle(dir) + (splat_roll - 0.85) / 0.15 * 25.0,
                size: 250.0 + (splat_roll - 0.7) / 0.3 * 150.0,
            });
        }

        let killed = self
            .world
            .get_mut::<Vitality>(victim.entity)
            .is_some_and(|mut vitality| vitality.apply_damage(part.kind, falloff));

        if killed {
            self.report.deaths.push(CombatantDied { victim: victim.entity, killer: shot.origin_character });
            self.play(AnimationRequest::new(victim.entity, AnimationGroup::Death));

            let by_player = shot.origin_character.is_some_and(|e| self.world.get::<Player>(e).is_some());
            if by_player {
                if let Some(mut stats) = self.world.get_resource_mut::<PlayerKillStats>() {
                    stats.increment_kills();
                }
            }
            logger::log_info(&format!("💀 {:?} убит выстрелом {:?}", victim.entity, shot.origin_character));
        }

        if victim.is_ai {
            self.add_panic(victim.entity, PANIC_ON_HIT);
        }

        self.wound(&shot, hit, part, victim, total, iteration, is_exit_wound);

        let still_alive = self.world.get::<Vitality>(victim.entity).is_some_and(|v| v.is_alive());
        if victim.flags.stun_on_non_fatal_attack && still_alive && !is_exit_wound {
            let forwards = (dir.x < 0.0) == victim.is_flipped;
            self.play(AnimationRequest::stun(victim.entity, forwards));
        }

        self.record(
            &shot,
            iteration,
            ShotOutcome::Damaged { victim: victim.entity, part: hit.entity, damage: falloff, killed },
        );

        let cosmetic = falloff / ((iteration + 1) as f32) < self.convars.cosmetic_damage_threshold;
        let next = ShotParams { is_cosmetic: cosmetic, ..shot.continue_from(hit.position) };
        self.segment(next, total, iteration + 1);
    }

    /// Рана на части тела + кровь
    #[allow(clippy::too_many_arguments)]
    fn wound(
        &mut self,
        shot: &ShotParams,
        hit: &RayHit,
        part: BodyPart,
        victim: &Victim,
        total: f32,
        iteration: u32,
        is_exit_wound: bool,
    ) {
        let mut size = bullet_hole_size(total, shot.damage, shot.cluster_size) / (iteration + 1) as f32
            * if is_exit_wound { 2.0 } else { 0.5 };
        if shot.is_cosmetic {
            size *= 0.5;
        }
        size /= victim.scale * victim.scale;

        let local = hit.position - victim.part_center(part.kind);
        let Some(mut marks) = self.world.get_mut::<WoundMarks>(hit.entity) else {
            return;
        };
        let applied = marks.add(local, size);
        if applied > INNER_CUTOUT_THRESHOLD {
            let towards = if is_exit_wound { shot.direction } else { hit.normal };
            marks.add_inner_cutout(local + towards * 18.0 * applied, applied + 1.0 / (victim.scale * victim.scale));
        }

        if applied > 0.0 {
            self.report.fx.push(CombatFx::BloodSpurt {
                position: hit.position,
                angle: vector_angle(if is_exit_wound { shot.direction } else { -shot.direction }),
                size: (applied * 4.0).clamp(1.0, 1.4),
            });
        }
    }

    fn victim(&self, owner: Entity) -> Option<Victim> {
        let actor = self.world.get::<Actor>(owner)?;
        let vitality = self.world.get::<Vitality>(owner)?;
        let flags = self.world.get::<CharacterFlags>(owner).copied().unwrap_or_default();
        let stats = self.world.get::<CombatStats>(owner).cloned().unwrap_or_default();
        let body = self.world.get::<CharacterBody>(owner).cloned().unwrap_or_default();
        let is_dodging = self
            .world
            .get::<AnimationState>(owner)
            .is_some_and(|a| a.constrains_any(AnimationConstraint::PREVENT_BEING_SHOT));
        let weapon_can_deflect = self
            .world
            .get::<EquippedWeapon>(owner)
            .and_then(|equipped| equipped.weapon)
            .and_then(|weapon| self.world.get::<Weapon>(weapon))
            .is_some_and(|weapon| weapon.can_deflect_bullets);

        Some(Victim {
            entity: owner,
            parts: self.world.get::<BodyParts>(owner).map(BodyParts::as_vec).unwrap_or_default(),
            faction: actor.faction_id,
            alive: vitality.is_alive(),
            is_player: self.world.get::<Player>(owner).is_some(),
            is_ai: self.world.get::<AiController>(owner).is_some(),
            flags,
            dodge_oversaturate: stats.dodge_oversaturate,
            agility: stats.agility,
            panic_intensity: stats.panic_intensity,
            is_flipped: body.is_flipped,
            is_blocking: body.is_melee_blocking,
            block_progress: body.melee_block_progress,
            head_position: body.head_position(),
            body_center: body.body_center(),
            scale: body.scale.max(0.01),
            is_dodging,
            weapon_can_deflect,
        })
    }

    fn armour_chance(&self, entity: Entity, kind: BodyPartKind) -> f32 {
        let Some(armour) = self.world.get::<Armour>(entity) else {
            return 0.0;
        };
        if armour.cosmetic {
            return 0.0;
        }
        match kind {
            BodyPartKind::Head => armour.head_deflection_chance(),
            BodyPartKind::Body => armour.body_deflection_chance(),
        }
    }

    fn has_dodge(&self, entity: Entity) -> bool {
        self.world.get::<DodgeMeter>(entity).is_some_and(DodgeMeter::has_dodge)
    }

    fn drain_dodge(&mut self, entity: Entity, amount: f32) {
        if let Some(mut dodge) = self.world.get_mut::<DodgeMeter>(entity) {
            dodge.drain(amount);
        }
    }

    fn add_panic(&mut self, entity: Entity, amount: f32) {
        if let Some(mut controller) = self.world.get_mut::<AiController>(entity) {
            controller.panic += amount;
        }
    }

    /// Анимация стартует сразу (следующая дробина уже видит dodge), событие уходит наружу
    fn play(&mut self, request: AnimationRequest) {
        if let Some(mut animation) = self.world.get_mut::<AnimationState>(request.entity) {
            animation.play(request.group, request.speed);
        }
        self.report.animations.push(request);
    }
}

impl Victim {
    fn part_center(&self, kind: BodyPartKind) -> Vec2 {
        match kind {
            BodyPartKind::Head => self.head_position,
            BodyPartKind::Body => self.body_center,
        }
    }
}
