use prost::Message;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let out_dir = std::path::PathBuf::from(std::env::var("OUT_DIR")?);

    // protox compiles the proto in-process; no system protoc required.
    let descriptors = protox::compile(["proto/kpture.proto"], ["proto"])?;
    std::fs::write(
        out_dir.join("kpture_descriptor.bin"),
        descriptors.encode_to_vec(),
    )?;

    tonic_build::configure()
        .build_client(true)
        .build_server(true)
        .compile_fds(descriptors)?;

    println!("cargo:rerun-if-changed=proto/kpture.proto");
    Ok(())
}
