#![allow(unsafe_code)] // pipe(2) setup

use std::io::{Read, Seek, SeekFrom};
use std::os::fd::AsRawFd;

use crashtrace::capture::{FrameBuffer, PlatformSymbols};
use crashtrace::dumper::{dump_frames_to_fd, dump_to_fd, prime};
use crashtrace::safe_write;
use crashtrace::walker::StackWalker;

fn read_back(file: &mut std::fs::File) -> String {
    file.seek(SeekFrom::Start(0)).expect("Failed to rewind dump file");
    let mut contents = String::new();
    file.read_to_string(&mut contents).expect("Failed to read dump file");
    contents
}

#[test]
fn test_dump_writes_frames() {
    prime();
    let mut file = tempfile::tempfile().expect("Failed to create temp file");

    dump_to_fd(file.as_raw_fd());

    let output = read_back(&mut file);
    println!("{output}");
    assert!(output.lines().count() >= 1);
    assert!(output.ends_with('\n'));
}

#[test]
fn test_dump_line_count_matches_walker() {
    let mut file = tempfile::tempfile().expect("Failed to create temp file");
    let frames = FrameBuffer::capture();

    dump_frames_to_fd(&frames, file.as_raw_fd());

    let output = read_back(&mut file);
    let report = StackWalker::new().render(&frames, 0);
    assert_eq!(output.lines().count(), frames.len());
    assert_eq!(output.lines().count(), report.len());
}

#[cfg(target_os = "linux")]
#[test]
fn test_dump_is_innermost_first() {
    let mut file = tempfile::tempfile().expect("Failed to create temp file");
    let frames = FrameBuffer::capture();

    dump_frames_to_fd(&frames, file.as_raw_fd());

    let output = read_back(&mut file);
    for (line, addr) in output.lines().zip(frames.addresses()) {
        assert!(line.ends_with(&format!("[{addr:#x}]")), "{line} does not end with {addr}");
    }
}

#[test]
fn test_dump_matches_platform_symbols() {
    let mut file = tempfile::tempfile().expect("Failed to create temp file");
    let frames = FrameBuffer::capture();
    let symbols = PlatformSymbols::for_frames(&frames);

    dump_frames_to_fd(&frames, file.as_raw_fd());

    let output = read_back(&mut file);
    assert_eq!(output.lines().count(), symbols.len());
}

#[test]
fn test_dump_to_invalid_fd_does_not_fail() {
    prime();
    dump_to_fd(-1);
    dump_to_fd(987_654);

    // Still running
    assert!(!StackWalker::new().walk(0).is_empty());
}

#[test]
fn test_dump_to_pipe_without_reader() {
    let mut fds = [0; 2];
    assert_eq!(unsafe { libc::pipe(fds.as_mut_ptr()) }, 0);
    unsafe { libc::close(fds[0]) };

    // SIGPIPE is ignored by the Rust runtime, so the write just fails
    dump_to_fd(fds[1]);
    assert!(!safe_write::write_bytes(fds[1], b"nobody listening\n"));

    unsafe { libc::close(fds[1]) };
}

#[test]
fn test_header_then_dump() {
    let mut file = tempfile::tempfile().expect("Failed to create temp file");
    let fd = file.as_raw_fd();

    assert!(safe_write::write_bytes(fd, b"signal "));
    assert!(safe_write::write_int(fd, 11));
    assert!(safe_write::write_bytes(fd, b"\n"));
    dump_to_fd(fd);

    let output = read_back(&mut file);
    let mut lines = output.lines();
    assert_eq!(lines.next(), Some("signal 11"));
    assert!(lines.next().is_some());
}
