use super::*;

fn noop(_: &mut BlitJob<'_>) -> HarnessResult<()> {
    Ok(())
}

const NOOP: AccelRoutine = AccelRoutine {
    name: "noop",
    run: noop,
};

fn key(op: OpKind, platform: Platform) -> RoutineKey {
    RoutineKey {
        op,
        dest_format: ColorFormat::Argb8888,
        src_format: None,
        platform,
    }
}

#[test]
fn empty_registry_has_no_routines() {
    let r = Registry::empty();
    assert!(r.is_empty());
    assert!(r.lookup(&key(OpKind::Fill, Platform::current())).is_none());
}

#[test]
fn builtin_matches_native_table() {
    let r = Registry::builtin();
    assert_eq!(r.len(), accel::native_routines().len());
    assert!(r.keys().all(|k| k.platform == Platform::current()));
}

#[test]
fn duplicate_registration_is_rejected() {
    let mut r = Registry::empty();
    r.register(key(OpKind::Fill, Platform::Portable), NOOP).unwrap();
    let err = r
        .register(key(OpKind::Fill, Platform::Portable), NOOP)
        .unwrap_err();
    assert!(err.to_string().contains("registered twice"));
}

#[test]
fn lookup_is_exact() {
    let mut r = Registry::empty();
    r.register(key(OpKind::Fill, Platform::Portable), NOOP).unwrap();
    assert!(r.lookup(&key(OpKind::Fill, Platform::Portable)).is_some());
    assert!(r.lookup(&key(OpKind::Fill, Platform::X86_64)).is_none());
    assert!(
        r.lookup(&key(OpKind::FillWithOpacity, Platform::Portable))
            .is_none()
    );
}

#[test]
fn key_display() {
    let k = RoutineKey {
        op: OpKind::ImageComposite,
        dest_format: ColorFormat::Rgb565,
        src_format: Some(ColorFormat::Argb8888),
        platform: Platform::Aarch64,
    };
    assert_eq!(k.to_string(), "image_composite/argb8888->rgb565/aarch64");
    assert_eq!(key(OpKind::Fill, Platform::X86_64).to_string(), "fill/argb8888/x86_64");
}

#[test]
fn blitters_report_their_kind() {
    assert_eq!(ReferenceBlitter.kind(), Implementation::Reference);
    assert_eq!(AcceleratedBlitter::new(NOOP).kind(), Implementation::Accelerated);
    assert_eq!(AcceleratedBlitter::new(NOOP).name(), "noop");
}
