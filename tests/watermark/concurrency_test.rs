// Independent files processed from several threads with one shared processor

use super::common::{gradient, text_config, write_image};
use bena_watermark::watermark::codec::probe;
use bena_watermark::watermark::{FontLocator, SourceFormat, WatermarkPosition, WatermarkProcessor};
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

#[test]
fn test_parallel_files_share_processor() {
    let dir = TempDir::new().unwrap();
    let processor = Arc::new(WatermarkProcessor::new(Arc::new(FontLocator::new(Vec::new()))));
    let config = Arc::new(text_config("bena.vn", WatermarkPosition::BottomLeft));

    let paths: Vec<_> = (0..8)
        .map(|i| {
            let format = if i % 2 == 0 { SourceFormat::Png } else { SourceFormat::Jpeg };
            let ext = if i % 2 == 0 { "png" } else { "jpg" };
            write_image(dir.path(), &format!("img-{}.{}", i, ext), &gradient(160, 120), format)
        })
        .collect();

    let handles: Vec<_> = paths
        .iter()
        .cloned()
        .map(|path| {
            let processor = Arc::clone(&processor);
            let config = Arc::clone(&config);
            thread::spawn(move || {
                let info = probe(&path).unwrap();
                processor.apply_to_file(&path, &info, &config).is_applied()
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }

    for path in &paths {
        let info = probe(path).unwrap();
        assert_eq!((info.width, info.height), (160, 120));
    }
}
