use super::*;

fn png_bytes(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([10, 20, 30, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "drape_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

#[test]
fn small_uploads_keep_their_size() {
    let (_, w, h) = normalize_upload(&png_bytes(40, 30), UploadLimits::default()).unwrap();
    assert_eq!((w, h), (40, 30));
}

#[test]
fn large_uploads_fit_inside_limits_preserving_aspect() {
    let limits = UploadLimits {
        max_width: 20,
        max_height: 40,
    };
    let (png, w, h) = normalize_upload(&png_bytes(100, 50), limits).unwrap();
    assert_eq!((w, h), (20, 10));

    let decoded = image::load_from_memory(&png).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (20, 10));
}

#[test]
fn memory_store_round_trips() {
    let mut store = MemoryImageStore::new(UploadLimits::default());
    let stored = store.store(&png_bytes(8, 6)).unwrap();
    assert!(stored.url.starts_with("mem://processed_"));
    assert_eq!((stored.width, stored.height), (8, 6));

    let bytes = store.fetch(&stored.url).unwrap();
    let img = image::load_from_memory(&bytes).unwrap();
    assert_eq!((img.width(), img.height()), (8, 6));
    assert!(store.fetch("mem://missing").is_err());
}

#[test]
fn garbage_upload_is_rejected_without_storing() {
    let mut store = MemoryImageStore::new(UploadLimits::default());
    assert!(store.store(b"nope").is_err());
    assert!(store.is_empty());
}

#[test]
fn dir_store_writes_and_fetches_by_file_name() {
    let root = temp_dir("image_store");
    let mut store = DirImageStore::new(&root, UploadLimits::default());
    let stored = store.store(&png_bytes(5, 5)).unwrap();
    assert!(root.join(&stored.url).is_file());
    assert!(!store.fetch(&stored.url).unwrap().is_empty());

    assert!(store.fetch("../etc/passwd").is_err());
    assert!(store.fetch("").is_err());
    std::fs::remove_dir_all(&root).ok();
}
