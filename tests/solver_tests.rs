use approx::assert_relative_eq;
use particle_collider::{
    Body, Collidable, DVec3, ImpulseSolver, Resolution, SolverSettings, Sphere,
};
use proptest::prelude::*;

fn body(id: &str, position: DVec3, velocity: DVec3) -> Body {
    Sphere::new(id, 1.0)
        .with_position(position)
        .with_velocity(velocity)
        .into()
}

fn kinetic_energy(bodies: [&Body; 2]) -> f64 {
    bodies
        .iter()
        .map(|b| 0.5 * b.velocity().unwrap().length_squared())
        .sum()
}

fn elastic() -> ImpulseSolver {
    ImpulseSolver::new(SolverSettings {
        restitution: 1.0,
        ..SolverSettings::default()
    })
}

fn vec3() -> impl Strategy<Value = DVec3> {
    (-0.6f64..0.6, -0.6f64..0.6, -0.6f64..0.6).prop_map(|(x, y, z)| DVec3::new(x, y, z))
}

fn velocity() -> impl Strategy<Value = DVec3> {
    (-3.0f64..3.0, -3.0f64..3.0, -3.0f64..3.0).prop_map(|(x, y, z)| DVec3::new(x, y, z))
}

proptest! {
    #[test]
    fn resolved_pairs_stop_approaching(
        pa in vec3(), pb in vec3(), va in velocity(), vb in velocity()
    ) {
        let mut a = body("a", pa, va);
        let mut b = body("b", pb, vb);
        let outcome = ImpulseSolver::default().resolve(0, &mut a, 1, &mut b).unwrap();
        prop_assume!(outcome != Resolution::NoContact);

        let separation = pa - pb;
        let normal = if separation.length() < 1e-9 {
            DVec3::X
        } else {
            separation.normalize()
        };
        let relative = (a.velocity().unwrap() - b.velocity().unwrap()).dot(normal);
        prop_assert!(relative >= -1e-9, "still approaching: {relative}");
    }

    #[test]
    fn elastic_collisions_conserve_energy(
        pa in vec3(), pb in vec3(), va in velocity(), vb in velocity()
    ) {
        let mut a = body("a", pa, va);
        let mut b = body("b", pb, vb);
        let before = kinetic_energy([&a, &b]);
        elastic().resolve(0, &mut a, 1, &mut b).unwrap();
        let after = kinetic_energy([&a, &b]);
        prop_assert!((before - after).abs() <= 1e-9 * before.max(1.0));
    }
}

#[test]
fn elastic_head_on_swaps_velocities() {
    let mut a = body("a", DVec3::new(-0.95, 0.0, 0.0), DVec3::new(0.5, 0.0, 0.0));
    let mut b = body("b", DVec3::new(0.95, 0.0, 0.0), DVec3::new(-0.5, 0.0, 0.0));

    let outcome = elastic().resolve(0, &mut a, 1, &mut b).unwrap();

    assert_eq!(outcome, Resolution::Applied { impulses: 1 });
    assert_relative_eq!(a.velocity().unwrap().x, -0.5, epsilon = 1e-12);
    assert_relative_eq!(b.velocity().unwrap().x, 0.5, epsilon = 1e-12);
}

#[test]
fn static_body_keeps_its_velocity() {
    let mut wall: Body = Sphere::new("wall", 1.0)
        .with_static(true)
        .with_position(DVec3::ZERO)
        .into();
    let mut ball = body("ball", DVec3::new(1.5, 0.0, 0.0), DVec3::new(-2.0, 0.0, 0.0));

    let outcome = elastic().resolve(0, &mut wall, 1, &mut ball).unwrap();

    assert!(outcome.applied());
    assert_eq!(wall.velocity().unwrap(), DVec3::ZERO);
    assert_relative_eq!(ball.velocity().unwrap().x, 2.0, epsilon = 1e-12);
}

#[test]
fn separating_bodies_are_untouched() {
    let mut a = body("a", DVec3::new(-0.5, 0.0, 0.0), DVec3::new(-1.0, 0.2, 0.0));
    let mut b = body("b", DVec3::new(0.5, 0.0, 0.0), DVec3::new(1.0, 0.0, 0.3));

    let outcome = ImpulseSolver::default().resolve(0, &mut a, 1, &mut b).unwrap();

    assert_eq!(outcome, Resolution::Separating);
    assert_eq!(a.velocity().unwrap(), DVec3::new(-1.0, 0.2, 0.0));
    assert_eq!(b.velocity().unwrap(), DVec3::new(1.0, 0.0, 0.3));
}

#[test]
fn tangential_velocity_is_preserved() {
    let mut a = body("a", DVec3::new(-0.9, 0.0, 0.0), DVec3::new(1.0, 0.7, 0.0));
    let mut b = body("b", DVec3::new(0.9, 0.0, 0.0), DVec3::new(-1.0, 0.0, -0.4));

    ImpulseSolver::default().resolve(0, &mut a, 1, &mut b).unwrap();

    assert_relative_eq!(a.velocity().unwrap().y, 0.7, epsilon = 1e-12);
    assert_relative_eq!(b.velocity().unwrap().z, -0.4, epsilon = 1e-12);
}
