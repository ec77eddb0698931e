fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Generated code is checked in under src/generated/. Regeneration needs
    // protoc on PATH, so it only runs when PERIMETER_REGEN_PROTO is set.
    println!("cargo:rerun-if-env-changed=PERIMETER_REGEN_PROTO");
    if std::env::var_os("PERIMETER_REGEN_PROTO").is_none() {
        return Ok(());
    }

    let proto = "../../proto/perimeter.proto";
    let proto_dir = "../../proto";

    if std::path::Path::new(proto).exists() {
        println!("cargo:rerun-if-changed={}", proto);

        std::fs::create_dir_all("src/generated")?;

        tonic_build::configure()
            .build_client(true)
            .build_server(true)
            .out_dir("src/generated")
            .compile(&[proto], &[proto_dir])?;
    }

    Ok(())
}
