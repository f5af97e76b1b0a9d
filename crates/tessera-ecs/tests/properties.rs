//! Model-based property tests: random operation sequences are applied to a
//! world and to a plain map, and the two must agree after every step.

use std::collections::BTreeMap;

use bytemuck::{Pod, Zeroable};
use proptest::prelude::*;
use tessera_ecs::{Entity, StoreConfig, World};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(transparent)]
struct Health(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(transparent)]
struct Energy(u64);

#[derive(Debug, Clone)]
enum Op {
    Create { health: bool, energy: bool },
    Delete(usize),
    InsertHealth(usize, u32),
    RemoveHealth(usize),
    SetEnergy(usize, u64),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (any::<bool>(), any::<bool>())
            .prop_map(|(health, energy)| Op::Create { health, energy }),
        1 => any::<usize>().prop_map(Op::Delete),
        2 => (any::<usize>(), any::<u32>()).prop_map(|(i, v)| Op::InsertHealth(i, v)),
        1 => any::<usize>().prop_map(Op::RemoveHealth),
        2 => (any::<usize>(), any::<u64>()).prop_map(|(i, v)| Op::SetEnergy(i, v)),
    ]
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct Expected {
    health: Option<Health>,
    energy: Option<Energy>,
}

/// Small tables so that growth and shrink happen constantly.
fn small_world() -> World {
    World::with_config(StoreConfig {
        default_capacity: 1,
        ..StoreConfig::default()
    })
    .unwrap()
}

fn pick(issued: &[Entity], i: usize) -> Option<Entity> {
    (!issued.is_empty()).then(|| issued[i % issued.len()])
}

fn apply(world: &mut World, model: &mut BTreeMap<Entity, Expected>, issued: &mut Vec<Entity>, op: &Op) {
    let health = world.register::<Health>();
    let energy = world.register::<Energy>();

    match *op {
        Op::Create { health: h, energy: e } => {
            let mut components = Vec::new();
            let mut expected = Expected::default();
            if h {
                components.push(health);
                expected.health = Some(Health(0));
            }
            if e {
                components.push(energy);
                expected.energy = Some(Energy(0));
            }
            let entity = world.create_entity(&components);
            issued.push(entity);
            model.insert(entity, expected);
        }
        Op::Delete(i) => {
            if let Some(entity) = pick(issued, i) {
                assert_eq!(world.delete_entity(entity), model.remove(&entity).is_some());
            }
        }
        Op::InsertHealth(i, v) => {
            if let Some(entity) = pick(issued, i) {
                let alive = model.contains_key(&entity);
                assert_eq!(world.insert(entity, Health(v)), alive);
                if let Some(expected) = model.get_mut(&entity) {
                    expected.health = Some(Health(v));
                }
            }
        }
        Op::RemoveHealth(i) => {
            if let Some(entity) = pick(issued, i) {
                let previous = model.get_mut(&entity).and_then(|x| x.health.take());
                assert_eq!(world.remove::<Health>(entity), previous);
            }
        }
        Op::SetEnergy(i, v) => {
            if let Some(entity) = pick(issued, i) {
                let slot = model.get_mut(&entity).and_then(|x| x.energy.as_mut());
                let has = slot.is_some();
                if let Some(slot) = slot {
                    *slot = Energy(v);
                }
                assert_eq!(world.set(entity, Energy(v)), has);
            }
        }
    }
}

fn check(world: &mut World, model: &BTreeMap<Entity, Expected>, issued: &[Entity]) {
    assert_eq!(world.entity_count(), model.len());

    for &entity in issued {
        let Some(expected) = model.get(&entity) else {
            assert!(!world.exists_entity(entity));
            continue;
        };

        assert!(world.exists_entity(entity));
        assert_eq!(world.get::<Health>(entity), expected.health);
        assert_eq!(world.get::<Energy>(entity), expected.energy);

        let record = world.entity_location(entity).unwrap();
        let archetype = world.archetypes().get(record.archetype).unwrap();
        assert!(record.row < archetype.len());
        assert_eq!(archetype.entity(record.row), entity);
    }

    let health = world.register::<Health>();
    let energy = world.register::<Energy>();
    let with_health = model.values().filter(|x| x.health.is_some()).count();
    let with_both = model
        .values()
        .filter(|x| x.health.is_some() && x.energy.is_some())
        .count();

    let query = world.query(&[health]);
    assert_eq!(query.iter(world).count(), with_health);
    let query = world.query(&[energy, health]);
    assert_eq!(query.iter(world).count(), with_both);
}

proptest! {
    #[test]
    fn world_matches_model(ops in prop::collection::vec(op(), 1..120)) {
        let mut world = small_world();
        let mut model = BTreeMap::new();
        let mut issued = Vec::new();

        for op in &ops {
            apply(&mut world, &mut model, &mut issued, op);
            check(&mut world, &model, &issued);
        }
    }

    #[test]
    fn ids_strictly_increase(deletes in prop::collection::vec(any::<bool>(), 1..200)) {
        let mut world = World::new();
        let mut previous: Option<Entity> = None;

        for (n, delete) in deletes.into_iter().enumerate() {
            let entity = world.create_entity(&[]);
            prop_assert_eq!(entity.id() as usize, 1 + n);
            if let Some(previous) = previous {
                prop_assert!(entity > previous);
            }
            if delete {
                world.delete_entity(entity);
            }
            previous = Some(entity);
        }
    }

    #[test]
    fn query_counts_match(flags in prop::collection::vec((any::<bool>(), any::<bool>()), 0..300)) {
        let mut world = World::new();
        let health = world.register::<Health>();
        let energy = world.register::<Energy>();

        for &(h, e) in &flags {
            let components: Vec<_> = [(h, health), (e, energy)]
                .into_iter()
                .filter_map(|(on, id)| on.then_some(id))
                .collect();
            world.create_entity(&components);
        }

        let with_health = flags.iter().filter(|(h, _)| *h).count();
        let with_both = flags.iter().filter(|(h, e)| *h && *e).count();

        let mut query = world.query(&[health]);
        let mut seen = 0;
        while query.advance(&world) {
            prop_assert!(world.has_component(query.entity(&world), health));
            seen += 1;
        }
        prop_assert_eq!(seen, with_health);

        let query = world.query(&[health, energy]);
        prop_assert_eq!(query.iter(&world).count(), with_both);
    }
}
