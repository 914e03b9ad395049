use uuid::Uuid;

use crate::auth::Scope;
use crate::cli::utils::output_json;
use crate::cli::{open_store, OutputFormat};
use crate::config::AppConfig;
use crate::grouping::{Family, GroupSection};
use crate::services::{department_export, DepartmentExport};

pub async fn handle(
    config: &AppConfig,
    department: Uuid,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let store = open_store(config);
    let export = department_export(&store, Scope::default(), department)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Department '{}' not found", department))?;

    match output_format {
        OutputFormat::Json => output_json(&export)?,
        OutputFormat::Text => print!("{}", render_text(&export)),
    }
    Ok(())
}

/// Plain-text board, one line per family
pub fn render_text(export: &DepartmentExport) -> String {
    let mut out = format!("{} ({}명)\n", export.department.name, export.headcount);
    let unassigned = std::iter::once(&export.board.unassigned);
    for section in export.board.sections.iter().chain(unassigned) {
        if section.headcount == 0 {
            continue;
        }
        render_section(&mut out, section);
    }
    out
}

fn render_section(out: &mut String, section: &GroupSection) {
    out.push_str(&format!("\n[{}] {}명\n", section.name, section.headcount));
    for family in &section.leaders {
        out.push_str(&format!("  * {}\n", family_line(family)));
    }
    for family in &section.members {
        out.push_str(&format!("  - {}\n", family_line(family)));
    }
}

fn family_line(family: &Family) -> String {
    match family.children_info() {
        Some(children) => format!("{} (자녀: {})", family.label(), children),
        None => family.label(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{Department, Group, MemberDirectory};
    use crate::grouping::build_board;

    #[test]
    fn text_lists_leaders_before_members() {
        let group = Group {
            id: Uuid::new_v4(),
            name: "1조".into(),
            department_id: Uuid::new_v4(),
        };
        let mut leader = MemberDirectory::new("박목자");
        leader.role_in_group = Some("leader".into());
        leader.group_id = Some(group.id);
        let mut husband = MemberDirectory::new("김철수");
        husband.spouse_name = Some("이영희".into());
        husband.children_info = Some("김하늘(7)".into());
        husband.group_id = Some(group.id);
        let mut wife = MemberDirectory::new("이영희");
        wife.spouse_name = Some("김철수".into());
        wife.group_id = Some(group.id);

        let board = build_board(&[group.clone()], &[leader, husband, wife]);
        let export = DepartmentExport {
            department: Department {
                id: group.department_id,
                name: "장년부".into(),
                church_id: Uuid::new_v4(),
            },
            headcount: board.headcount(),
            board,
        };

        let text = render_text(&export);
        assert!(text.starts_with("장년부 (3명)\n"));
        let leader_at = text.find("* 박목자").unwrap();
        let couple_at = text.find("- 김철수 · 이영희 (자녀: 김하늘(7))").unwrap();
        assert!(leader_at < couple_at);
        assert!(!text.contains("미배정"));
    }
}
