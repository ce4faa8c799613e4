use super::ExitCode;
use crate::output::{print_json, print_table};
use agentlint_core::checks::{catalog, find_check};

pub fn run(id: Option<&str>, json: bool) -> anyhow::Result<ExitCode> {
    if let Some(id) = id {
        return show(id, json);
    }

    let checks = catalog();

    if json {
        print_json(&checks)?;
        return Ok(0);
    }

    let rows = checks
        .iter()
        .map(|c| {
            vec![
                c.id.to_string(),
                c.certainty.to_string(),
                c.category.to_string(),
                c.description.to_string(),
            ]
        })
        .collect();
    print_table(&["ID", "CERTAINTY", "CATEGORY", "DESCRIPTION"], rows);
    Ok(0)
}

fn show(id: &str, json: bool) -> anyhow::Result<ExitCode> {
    let Some(check) = find_check(id) else {
        anyhow::bail!("unknown check '{id}' (run `agentlint checks` for the list)");
    };
    let info = check.info();

    if json {
        print_json(&info)?;
    } else {
        println!("ID:          {}", info.id);
        println!("Certainty:   {}", info.certainty);
        println!("Category:    {}", info.category);
        println!("Description: {}", info.description);
    }
    Ok(0)
}
