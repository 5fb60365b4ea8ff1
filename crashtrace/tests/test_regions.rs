use crashtrace::capture::FrameBuffer;
use crashtrace::domain::Address;
use crashtrace::symbolization::{DynamicLoader, RegionTable, Resolve};

#[cfg(target_os = "linux")]
#[test]
fn test_captured_frames_lie_in_executable_regions() {
    let table = RegionTable::current_process().expect("Failed to read /proc/self/maps");
    let frames = FrameBuffer::capture();

    for addr in frames.addresses() {
        let region = table.region_for(addr).unwrap_or_else(|| panic!("{addr} is not mapped"));
        println!("{addr} -> {region}");
        assert!(region.is_executable());
    }
}

#[cfg(target_os = "linux")]
#[test]
fn test_region_table_agrees_with_loader_on_module() {
    let table = RegionTable::current_process().expect("Failed to read /proc/self/maps");
    let addr = Address(libc::getpid as *const () as usize);

    let from_loader = DynamicLoader.resolve(addr).expect("libc should be loaded");
    let from_table = table.resolve(addr).expect("libc should be mapped");

    // The loader reports the soname path, maps the resolved file
    println!("loader: {}, maps: {}", from_loader.module, from_table.module);
    assert!(from_loader.module.contains("libc"));
    assert!(from_table.module.contains("libc"));
}

#[test]
fn test_unmapped_address_is_unresolved() {
    assert!(DynamicLoader.resolve(Address(0x10)).is_none());
}
