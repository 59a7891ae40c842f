use torchlight_geom::{Cell, Vec3};

fn approx_eq(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() <= eps
}

fn vec3_approx_eq(a: Vec3, b: Vec3, eps: f32) -> bool {
    approx_eq(a.x, b.x, eps) && approx_eq(a.y, b.y, eps) && approx_eq(a.z, b.z, eps)
}

#[test]
fn vec3_add_sub() {
    let a = Vec3::new(1.0, 2.0, 3.0);
    let b = Vec3::new(-4.0, 5.0, -6.0);
    let c = a + b;
    assert!(vec3_approx_eq(c, Vec3::new(-3.0, 7.0, -3.0), 1e-6));

    let d = c - a;
    assert!(vec3_approx_eq(d, b, 1e-6));
}

#[test]
fn cell_center_floors_back() {
    let c = Cell::new(-3, 70, 12);
    assert!(vec3_approx_eq(c.center(), Vec3::new(-2.5, 70.5, 12.5), 1e-6));
    assert_eq!(c.center().cell(), c);
}

#[test]
fn cell_key_is_space_separated() {
    assert_eq!(Cell::new(-1, 64, 0).key(), "-1 64 0");
    assert_eq!("  4   5 -6 ".parse::<Cell>().unwrap(), Cell::new(4, 5, -6));
}
