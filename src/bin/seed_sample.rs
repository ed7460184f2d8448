use anyhow::Result;

fn main() -> Result<()> {
    let root = std::path::Path::new("dev/practice");
    let layout = practicedb::sample::write_sample(root)?;
    println!("Seeded sample data under {}", root.display());
    println!(
        "Load it with: practicedb --schema {} --data-dir {} --database {}",
        layout.schema.display(),
        layout.data_dir.display(),
        layout.database.display()
    );
    Ok(())
}
