use particle_collider::{
    Body, Collidable, CollisionEngine, DVec3, ExecutionMode, PipelineConfig, PipelineMode, Sphere,
};
use std::sync::Arc;
use std::thread;

#[test]
fn test_engine_and_bodies_are_sync_and_send() {
    fn assert_sync_send<T: Sync + Send>() {}
    assert_sync_send::<CollisionEngine>();
    assert_sync_send::<Body>();
    assert_sync_send::<PipelineConfig>();
}

#[test]
fn test_shared_engine_across_threads() {
    let config = PipelineConfig::new()
        .with_pipeline(PipelineMode::Fused)
        .with_broad_phase_mode(ExecutionMode::PartitionedParallel)
        .with_partition_workers(3);
    let engine = Arc::new(CollisionEngine::new(config));

    let mut handles = vec![];
    for t in 0..4 {
        let engine = Arc::clone(&engine);
        let handle = thread::spawn(move || {
            for i in 0..25 {
                let x = (t * 25 + i) as f64 * 0.8;
                engine.add_body(
                    Sphere::new(format!("t{t}-{i}"), 0.5)
                        .with_position(DVec3::new(x, 0.0, 0.0))
                        .with_velocity(DVec3::new(if i % 2 == 0 { 1.0 } else { -1.0 }, 0.0, 0.0)),
                );
            }
            engine.process_collisions().unwrap()
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(engine.len(), 100);
    let report = engine.process_collisions().unwrap();
    assert_eq!(report.body_count, 100);
    engine.with_bodies(|bodies| {
        assert!(bodies
            .windows(2)
            .all(|pair| pair[0].sort_key() <= pair[1].sort_key()));
        assert!(bodies.iter().all(|b| b.velocity().unwrap().is_finite()));
    });
}

#[test]
fn test_bodies_can_be_moved_between_passes() {
    let engine = CollisionEngine::default();
    engine.add_body(Sphere::new("a", 1.0).with_velocity(DVec3::X));
    engine.add_body(Sphere::new("b", 1.0).with_position(DVec3::new(5.0, 0.0, 0.0)));

    assert_eq!(engine.process_collisions().unwrap().candidate_pairs, 0);

    engine.with_bodies_mut(|bodies| {
        for body in bodies.iter_mut() {
            let position = body.position().unwrap();
            let velocity = body.velocity().unwrap();
            body.set_position(position + velocity * 3.5);
        }
    });

    let report = engine.process_collisions().unwrap();
    assert_eq!(report.contacts, 1);
    assert_eq!(report.resolved_pairs, 1);
}
