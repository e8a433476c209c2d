#![allow(dead_code)]

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

/// Writing a script while another test forks can leave it "text file busy"
pub static SPAWN_LOCK: Mutex<()> = Mutex::new(());

/// Entry of a fixture archive
pub enum Fixture<'a> {
    File(&'a str, &'a [u8]),
    Dir(&'a str),
}

/// Build a zip at `path` holding `entries` in order
pub fn build_archive(path: &Path, entries: &[Fixture]) {
    let mut writer = ZipWriter::new(File::create(path).unwrap());
    for entry in entries {
        match entry {
            Fixture::File(name, data) => {
                writer.start_file(*name, SimpleFileOptions::default()).unwrap();
                writer.write_all(data).unwrap();
            }
            Fixture::Dir(name) => {
                writer.add_directory(*name, SimpleFileOptions::default()).unwrap();
            }
        }
    }
    writer.finish().unwrap();
}

/// The reference archive: two videos, one shadow file, one directory
pub fn reference_archive(path: &Path) {
    build_archive(
        path,
        &[
            Fixture::File("a.mp4", b"original video a"),
            Fixture::Dir("b/"),
            Fixture::File("b/._shadow.mp4", b"resource fork"),
            Fixture::File("b/c.MOV", b"original video c"),
        ],
    );
}

pub fn entry_names(path: &Path) -> BTreeSet<String> {
    let archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    archive.file_names().map(String::from).collect()
}

pub fn read_entry(path: &Path, name: &str) -> Vec<u8> {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut entry = archive.by_name(name).unwrap();
    let mut data = Vec::new();
    entry.read_to_end(&mut data).unwrap();
    data
}

/// Stand-in transcoder: answers `-version`, writes "converted" to its last argument,
/// and exits 0 without output for inputs whose name contains "broken"
#[cfg(unix)]
pub fn fake_ffmpeg(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-ffmpeg");
    std::fs::write(
        &path,
        "#!/bin/sh\n\
         if [ \"$1\" = \"-version\" ]; then echo 'ffmpeg version test'; exit 0; fi\n\
         for last; do :; done\n\
         case \"$*\" in *broken*) exit 0 ;; esac\n\
         printf converted > \"$last\"\n",
    )
    .unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}
