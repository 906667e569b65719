//! Walks one character through a short fight-and-level loop.
//!
//! Run with `RUST_LOG=zzlevel=debug` to see every pipeline step.

use tracing_subscriber::EnvFilter;
use zzlevel::*;

fn main() -> Result<(), StatError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ProgressionConfig::default();
    let catalog = StaticSpellCatalog::new()
        .with_unlock(2, "Fire", "ember")
        .with_unlock(3, "Fire", "fireball")
        .with_unlock(3, "Ice", "frost_nova");

    let growth = GrowthTable::new()
        .with_rule(StatKind::Attack, GrowthRule::Constant { value: 3.0 })
        .with_rule(StatKind::Health, GrowthRule::Constant { value: 12.0 })
        .with_rule(StatKind::Mana, GrowthRule::Constant { value: 6.0 })
        .with_rule(
            StatKind::Speed,
            GrowthRule::Linear {
                base: 0.5,
                per_level: 0.25,
            },
        );

    let adjustments = AdjustmentSet::from(vec![
        StatAdjustment::new("Fire")
            .with_multiplier(StatKind::Attack, 1.2)
            .with_multiplier(StatKind::Defense, 0.9),
        StatAdjustment::new("Ice").with_multiplier(StatKind::Defense, 1.3),
    ]);

    let mut hero = Character::new(CharacterId(1), TypeTag::new("Fire"), config)
        .with_base_stats(
            BaseStats::new()
                .with(StatKind::Attack, 15.0)
                .with(StatKind::Defense, 8.0)
                .with(StatKind::Health, 120.0)
                .with(StatKind::Mana, 40.0)
                .with(StatKind::Speed, 5.0),
        )
        .with_growth(growth)
        .with_adjustments(adjustments);

    hero.engine_mut()
        .try_equip_item(Equipment::flat(ItemId(1), "Iron Sword", StatKind::Attack, 5.0))?;
    hero.engine_mut()
        .try_equip_item(Equipment::percent(ItemId(2), "Ruby Ring", StatKind::Attack, 10.0))?;
    hero.engine_mut().add_effect(
        StatusEffect::buff(EffectId(1), StatKind::All, ModifierValue::Percent(5.0))
            .named("Blessing"),
    );

    println!("== {} ({}) ==", hero.id(), hero.type_tag());
    let attack = hero.resolve(&StatKind::Attack, Stages::EFFECTIVE)?;
    println!("Attack breakdown:");
    for (step, value) in &attack.steps {
        println!("  {step:<32} {value:>8.2}");
    }

    hero.engine_mut().apply_damage(70.0);
    println!(
        "After a hit: {:.1} / {:.1} HP",
        hero.effective_stat(&StatKind::CurrentHealth)?,
        hero.effective_stat(&StatKind::Health)?
    );

    let mut events: Vec<LevelUpEvent> = Vec::new();
    let gained = hero.grant_experience(100, &catalog, &mut events);
    println!("Gained {gained} levels, now level {}", hero.level());
    for event in &events {
        println!("  level {} unlocked {:?}", event.level, event.unlocked_spells);
    }

    for kind in [StatKind::Attack, StatKind::Health, StatKind::Speed] {
        println!(
            "  {kind:<8} raw {:>7.2}  adjusted {:>7.2}  effective {:>7.2}",
            hero.raw_stat(&kind),
            hero.adjusted_stat(&kind)?,
            hero.effective_stat(&kind)?
        );
    }

    let mut echo = hero.spawn_derived(CharacterId(2));
    println!(
        "Echo attack {:.2} (no identity adjustment), hero attack {:.2}",
        echo.effective_stat(&StatKind::Attack)?,
        hero.effective_stat(&StatKind::Attack)?
    );

    hero.engine_mut().unequip_item(ItemId(1));
    hero.engine_mut().clear_effects();
    let snapshot = hero.to_json()?;
    let restored = Character::from_json(&snapshot)?;
    println!("Snapshot restored: {}", restored == hero);

    Ok(())
}
