use super::*;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn size_rejects_zero_dimensions() {
    assert!(Size::new(0, 10).is_err());
    assert!(Size::new(10, 0).is_err());
    assert_eq!(
        Size::new(3, 4).unwrap(),
        Size {
            width: 3,
            height: 4
        }
    );
}

#[test]
fn transform_to_affine_identity_and_translation() {
    let size = Size::new(10, 20).unwrap();
    assert_eq!(Transform2D::default().to_affine(size), Affine::IDENTITY);

    let t = Transform2D {
        left: 10.0,
        top: -2.5,
        ..Transform2D::default()
    };
    assert_eq!(
        t.to_affine(size),
        Affine::translate(Vec2::new(10.0, -2.5))
    );
}

#[test]
fn unrotated_affine_maps_corners_to_left_top_and_scaled_extent() {
    let size = Size::new(100, 50).unwrap();
    let t = Transform2D::uniform(0.5, 20.0, 30.0);
    let a = t.to_affine(size);

    let tl = a * Point::new(0.0, 0.0);
    let br = a * Point::new(100.0, 50.0);
    assert!(approx(tl.x, 20.0) && approx(tl.y, 30.0));
    assert!(approx(br.x, 70.0) && approx(br.y, 55.0));
}

#[test]
fn rotation_pivots_around_scaled_center() {
    let size = Size::new(100, 100).unwrap();
    let t = Transform2D {
        rotation: 90.0,
        ..Transform2D::uniform(1.0, 0.0, 0.0)
    };
    let a = t.to_affine(size);

    let center = a * Point::new(50.0, 50.0);
    assert!(approx(center.x, 50.0) && approx(center.y, 50.0));

    let corner = a * Point::new(0.0, 0.0);
    assert!(approx(corner.x, 100.0) && approx(corner.y, 0.0));
}

#[test]
fn map_point_applies_scale_then_offset() {
    let t = Transform2D::uniform(0.25, 100.0, 10.0);
    let p = t.map_point(40.0, 80.0);
    assert!(approx(p.x, 110.0) && approx(p.y, 30.0));
}

#[test]
fn straight_to_premul_rounds() {
    let c = Rgba8Premul::from_straight_rgba(255, 128, 0, 128);
    assert_eq!(c.to_array(), [128, 64, 0, 128]);
}
