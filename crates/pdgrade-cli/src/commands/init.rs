//! The `pdgrade init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("pdgrade.toml").exists() {
        println!("pdgrade.toml already exists, skipping.");
    } else {
        std::fs::write("pdgrade.toml", SAMPLE_CONFIG)?;
        println!("Created pdgrade.toml");
    }

    std::fs::create_dir_all("submissions")?;
    let example_path = std::path::Path::new("submissions/example.toml");
    if example_path.exists() {
        println!("submissions/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_SUBMISSION)?;
        println!("Created submissions/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Run: pdgrade topics");
    println!("  2. Run: pdgrade validate --submission submissions/example.toml");
    println!("  3. Run: pdgrade score --submission submissions");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# pdgrade configuration

# Extra topics layered over the built-in floorplanning/placement/routing tables.
# dictionary = "${HOME}/.config/pdgrade/topics.toml"

parallelism = 4
strict_topics = false
output_dir = "./pdgrade-results"
"#;

const EXAMPLE_SUBMISSION: &str = r#"[submission]
id = "example-001"
engineer = "new-hire"
assignment = "floorplanning-basics"
topic = "floorplanning"

[[answers]]
question = "How do you decide where to place hard macros?"
text = """
I analyze the dataflow between macros and the standard-cell logic first, then
place the macros along the core boundary with a halo and placement blockage so
that channels stay routable. Pin placement follows the top-level IO ring, and I
check utilization stays around 70% with an aspect ratio close to 1.
"""

[[answers]]
question = "How do you plan the power grid?"
text = """
My approach is to size the power grid from the power budget, add power rings
around the core and macros, and run IR drop analysis in Voltus. I optimize
stripe pitch until static IR drop stays below 5% of VDD at 1.2 GHz.
"""

[[answers]]
question = "What causes thermal hotspots?"
text = "High switching density."
"#;
