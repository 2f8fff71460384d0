//! `lexskill skills`: list the built-in skills.

use lexskill_skills::builtin_skills;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    for skill in builtin_skills() {
        let config = skill.config();
        println!("  {:<22} {}", config.name, config.description);
    }
    Ok(())
}
