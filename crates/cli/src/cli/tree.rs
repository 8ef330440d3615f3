use clap::Args;
use console::style;

use esi_typegen_core::TypePlan;

use crate::cli::common::{InputArgs, load_plan};
use crate::cli::run_command;

#[derive(Args, Debug, Clone)]
pub struct TreeArgs {
    #[command(flatten)]
    pub input: InputArgs,
    #[arg(long, help = "List the declarations placed in each namespace")]
    pub members: bool,
}

pub fn run(args: TreeArgs) -> i32 {
    run_command(|| run_inner(args))
}

fn run_inner(args: TreeArgs) -> Result<(), String> {
    let plan = load_plan(&args.input)?;
    print!("{}", render_tree(&plan, args.members));
    Ok(())
}

/// Indented listing of the attached namespaces with declared/total counts.
fn render_tree(plan: &TypePlan, members: bool) -> String {
    let tree = &plan.tree;
    let mut output = String::new();
    for namespace in tree.iter() {
        let depth = tree.ancestors(namespace.id).len().saturating_sub(1);
        let indent = "  ".repeat(depth);
        let label = if namespace.parent.is_none() {
            "(root)".to_string()
        } else {
            namespace.name.clone()
        };
        output.push_str(&format!(
            "{indent}{} {}\n",
            style(label).bold(),
            style(format!(
                "[{}/{}]",
                tree.declared_count(&plan.graph, namespace.id),
                namespace.members.len()
            ))
            .dim()
        ));
        if members {
            for id in &namespace.members {
                let node = plan.graph.node(*id);
                let name = node.name().map_or_else(|| node.label(), str::to_string);
                output.push_str(&format!(
                    "{indent}  - {name} {}\n",
                    style(node.kind.label()).cyan()
                ));
            }
        }
    }
    output
}
