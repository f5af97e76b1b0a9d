//! End-to-end store scenarios.

use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};
use tessera_ecs::{ComponentId, Entity, StoreConfig, World};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(transparent)]
struct Health(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(transparent)]
struct Energy(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
struct Heading([i32; 3]);

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn count(world: &mut World, components: &[ComponentId]) -> usize {
    let mut query = world.query(components);
    let mut n = 0;
    while query.advance(world) {
        n += 1;
    }
    n
}

#[test]
fn single_component_lifecycle() {
    let mut world = World::new();
    let tag = world.register::<u32>();
    let other = world.register::<u64>();

    let e = world.create_entity(&[]);
    assert!(world.exists_entity(e));
    assert!(!world.has_component(e, other));

    assert!(world.add_component(e, tag));
    assert!(world.has_component(e, tag));

    assert!(world.set_component(e, tag, &42u32.to_ne_bytes()));
    assert_eq!(world.get::<u32>(e), Some(42));

    assert!(world.remove_component(e, tag));
    assert!(!world.has_component(e, tag));
    assert_eq!(world.get_component(e, tag), None);
    assert!(world.exists_entity(e));
}

#[test]
fn query_completeness() {
    let mut world = World::new();
    let a = world.register::<Health>();
    let b = world.register::<Energy>();

    for i in 0..100 {
        if i % 2 == 0 {
            world.create_entity(&[a, b]);
        } else {
            world.create_entity(&[a]);
        }
    }
    // Noise that must not show up in either query.
    for _ in 0..10 {
        world.create_entity(&[b]);
    }

    assert_eq!(count(&mut world, &[a]), 100);
    assert_eq!(count(&mut world, &[a, b]), 50);
    assert_eq!(count(&mut world, &[b, a]), 50);
    assert_eq!(count(&mut world, &[b]), 60);
}

#[test]
fn swap_remove_keeps_other_entities_intact() {
    let mut world = World::new();
    let entities: Vec<Entity> = (0..10u32).map(|i| world.spawn(Health(i))).collect();

    assert!(world.delete_entity(entities[3]));
    assert!(world.delete_entity(entities[0]));
    assert!(world.delete_entity(entities[9]));

    for (i, &e) in entities.iter().enumerate() {
        match i {
            0 | 3 | 9 => assert!(!world.exists_entity(e)),
            _ => assert_eq!(world.get::<Health>(e), Some(Health(i as u32))),
        }
    }
}

#[test]
fn migration_preserves_shared_state() {
    let mut world = World::new();
    let e = world.spawn(Health(7));
    world.insert(e, Energy(70));

    world.insert(e, Heading([1, 2, 3]));
    assert_eq!(world.get::<Health>(e), Some(Health(7)));
    assert_eq!(world.get::<Energy>(e), Some(Energy(70)));

    world.remove::<Energy>(e);
    assert_eq!(world.get::<Health>(e), Some(Health(7)));
    assert_eq!(world.get::<Heading>(e), Some(Heading([1, 2, 3])));
}

#[test]
fn new_component_starts_zeroed() {
    let mut world = World::new();
    let energy = world.register::<Energy>();
    let e = world.spawn(Health(1));

    world.add_component(e, energy);
    assert_eq!(world.get::<Energy>(e), Some(Energy(0)));
}

#[test]
fn idempotent_noops() {
    let mut world = World::new();
    let health = world.register::<Health>();
    let e = world.spawn(Health(3));
    let archetypes = world.archetypes().len();
    let location = world.entity_location(e);

    assert!(!world.add_component(e, health));
    assert_eq!(world.entity_location(e), location);
    assert_eq!(world.get::<Health>(e), Some(Health(3)));

    assert!(!world.delete_entity(Entity::from_raw(9999)));
    assert_eq!(world.entity_count(), 1);
    assert_eq!(world.archetypes().len(), archetypes);
}

#[test]
fn tables_grow_and_shrink() {
    init_tracing();
    let config = StoreConfig {
        default_capacity: 4,
        ..StoreConfig::default()
    };
    let mut world = World::with_config(config).unwrap();
    let entities: Vec<Entity> = (0..100).map(|i| world.spawn(Health(i))).collect();

    let location = world.entity_location(entities[0]).unwrap();
    let capacity = |world: &World| world.archetypes().get(location.archetype).unwrap().capacity();
    assert_eq!(capacity(&world), 128);

    for &e in &entities[..98] {
        world.delete_entity(e);
    }
    assert_eq!(capacity(&world), 8);
    assert_eq!(world.get::<Health>(entities[98]), Some(Health(98)));
    assert_eq!(world.get::<Health>(entities[99]), Some(Health(99)));
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct Expected {
    health: Option<Health>,
    energy: Option<Energy>,
    heading: Option<Heading>,
}

fn verify(world: &World, model: &HashMap<Entity, Expected>) {
    assert_eq!(world.entity_count(), model.len());
    for (&e, expected) in model {
        assert!(world.exists_entity(e));
        assert_eq!(world.get::<Health>(e), expected.health, "{e:?}");
        assert_eq!(world.get::<Energy>(e), expected.energy, "{e:?}");
        assert_eq!(world.get::<Heading>(e), expected.heading, "{e:?}");
    }
}

#[test]
fn randomized_stress() {
    init_tracing();
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut world = World::new();
    let heading = world.register::<Heading>();
    let mut model: HashMap<Entity, Expected> = HashMap::new();

    let mut first_wave = Vec::with_capacity(10_000);
    for _ in 0..10_000 {
        let e = world.create_entity(&[]);
        first_wave.push(e);
        model.insert(e, Expected::default());
    }

    for &e in &first_wave {
        let expected = model.get_mut(&e).unwrap();
        if rng.gen_bool(0.5) {
            let value = Health(rng.r#gen());
            assert!(world.insert(e, value));
            expected.health = Some(value);
        }
        if rng.gen_bool(0.5) {
            let value = Energy(rng.r#gen());
            assert!(world.insert(e, value));
            expected.energy = Some(value);
        }
    }

    // Overwrite a random subset in place.
    for _ in 0..5_000 {
        let e = first_wave[rng.gen_range(0..first_wave.len())];
        let expected = model.get_mut(&e).unwrap();
        let value = Health(rng.r#gen());
        assert_eq!(world.set(e, value), expected.health.is_some());
        if expected.health.is_some() {
            expected.health = Some(value);
        }
    }

    first_wave.shuffle(&mut rng);
    for &e in &first_wave[..5_000] {
        assert!(world.delete_entity(e));
        model.remove(&e);
    }
    verify(&world, &model);

    let mut second_wave = Vec::with_capacity(10_000);
    for _ in 0..10_000 {
        let e = world.create_entity(&[heading]);
        second_wave.push(e);
        model.insert(
            e,
            Expected {
                heading: Some(Heading([0; 3])),
                ..Expected::default()
            },
        );
    }

    let live: Vec<Entity> = model.keys().copied().collect();
    for _ in 0..20_000 {
        let e = live[rng.gen_range(0..live.len())];
        let expected = model.get_mut(&e).unwrap();
        match rng.gen_range(0..3) {
            0 => {
                let value = Health(rng.r#gen());
                world.insert(e, value);
                expected.health = Some(value);
            }
            1 => {
                let value = Energy(rng.r#gen());
                world.insert(e, value);
                expected.energy = Some(value);
            }
            _ => {
                let value = Heading([rng.r#gen(), rng.r#gen(), rng.r#gen()]);
                world.insert(e, value);
                expected.heading = Some(value);
            }
        }
    }
    verify(&world, &model);

    // Ids were never reused across both waves.
    let max_first = first_wave.iter().max().unwrap();
    assert!(second_wave.iter().all(|e| e > max_first));
    assert!(second_wave.windows(2).all(|w| w[0] < w[1]));

    let health = world.component_id::<Health>().unwrap();
    let with_health = model.values().filter(|x| x.health.is_some()).count();
    assert_eq!(count(&mut world, &[health]), with_health);

    let bytes = world.archetypes().byte_size();
    let archetypes = world.archetypes().len();
    let report = world.shutdown();
    assert_eq!(report.entities, model.len());
    assert_eq!(report.archetypes, archetypes);
    assert_eq!(report.bytes, bytes);
}
