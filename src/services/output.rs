use crate::domain::models::{JsonOut, LookupResult};

pub fn print_result(json: bool, result: &LookupResult) -> anyhow::Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&JsonOut {
                ok: result.is_success(),
                data: result,
            })?
        );
    } else {
        println!("vin: {}", result.vin);
        println!("status: {}", result.status);
        if !result.description.is_empty() {
            println!("description: {}", result.description);
        }
        for (label, value) in result.attributes.iter() {
            println!("{label}\t{value}");
        }
    }
    Ok(())
}
