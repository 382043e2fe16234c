// SPDX-License-Identifier: MIT

//! Built-in workflow templates
//!
//! The fixed catalog shipped with the simulator. Built-ins are immutable
//! and never deletable; user-authored workflows live in the store.

use once_cell::sync::Lazy;

use super::types::{StepDefinition, WorkflowDefinition};

fn workflow(id: &str, name: &str, description: &str, steps: &[(&str, &str, &str)]) -> WorkflowDefinition {
    WorkflowDefinition {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        steps: steps
            .iter()
            .map(|(id, title, description)| StepDefinition {
                id: id.to_string(),
                title: title.to_string(),
                description: description.to_string(),
            })
            .collect(),
    }
}

static BUILTIN: Lazy<Vec<WorkflowDefinition>> = Lazy::new(|| {
    vec![
        workflow(
            "job-application",
            "Job Application Flow",
            "Track job application process from apply to offer",
            &[
                ("step-1", "Apply", "Submit application and resume"),
                ("step-2", "Screening", "HR reviews application"),
                ("step-3", "Technical Interview", "Technical skills assessment"),
                ("step-4", "HR Interview", "Culture fit discussion"),
                ("step-5", "Offer", "Receive job offer"),
            ],
        ),
        workflow(
            "software-development",
            "Software Development Flow",
            "CI/CD pipeline for software delivery",
            &[
                ("step-1", "Code", "Write and commit code"),
                ("step-2", "Build", "Compile and build application"),
                ("step-3", "Test", "Run automated tests"),
                ("step-4", "Deploy", "Deploy to staging/production"),
                ("step-5", "Monitor", "Monitor application health"),
            ],
        ),
        workflow(
            "order-processing",
            "Order Processing Flow",
            "E-commerce order fulfillment process",
            &[
                ("step-1", "Order Received", "New order placed"),
                ("step-2", "Payment Verification", "Verify payment details"),
                ("step-3", "Inventory Check", "Check product availability"),
                ("step-4", "Packaging", "Package order for shipping"),
                ("step-5", "Shipping", "Send to logistics partner"),
                ("step-6", "Delivered", "Customer receives order"),
            ],
        ),
        workflow(
            "onboarding",
            "Employee Onboarding Flow",
            "New employee integration process",
            &[
                ("step-1", "Welcome Email", "Send welcome package"),
                ("step-2", "Documentation", "Complete HR paperwork"),
                ("step-3", "IT Setup", "Setup workstation and accounts"),
                ("step-4", "Training", "Complete orientation training"),
                ("step-5", "Team Introduction", "Meet the team"),
                ("step-6", "First Project", "Assign first task"),
            ],
        ),
        workflow(
            "bug-fix",
            "Bug Fix Workflow",
            "Issue tracking and resolution process",
            &[
                ("step-1", "Bug Reported", "Issue logged in system"),
                ("step-2", "Triage", "Assess bug severity"),
                ("step-3", "Investigation", "Find root cause"),
                ("step-4", "Fix Implementation", "Develop solution"),
                ("step-5", "Code Review", "Peer review changes"),
                ("step-6", "QA Testing", "Verify fix works"),
                ("step-7", "Deploy Fix", "Release to production"),
            ],
        ),
        workflow(
            "cloud-deployment",
            "Cloud Deployment Flow",
            "Cloud infrastructure deployment and configuration",
            &[
                ("step-1", "Infrastructure Planning", "Define resource requirements"),
                ("step-2", "Environment Setup", "Configure cloud environment"),
                ("step-3", "Database Setup", "Deploy and configure databases"),
                ("step-4", "Application Deployment", "Deploy application containers"),
                ("step-5", "Load Balancer Config", "Setup traffic distribution"),
                ("step-6", "SSL Configuration", "Configure SSL certificates"),
                ("step-7", "Monitoring Setup", "Deploy monitoring agents"),
                ("step-8", "Health Check", "Verify all services are healthy"),
            ],
        ),
        workflow(
            "marketing-campaign",
            "Marketing Campaign Flow",
            "End-to-end marketing campaign execution",
            &[
                ("step-1", "Campaign Planning", "Define campaign objectives and target audience"),
                ("step-2", "Content Creation", "Design and create marketing assets"),
                ("step-3", "Channel Selection", "Choose marketing channels"),
                ("step-4", "Campaign Setup", "Configure campaign in marketing tools"),
                ("step-5", "Launch Campaign", "Go live with campaign"),
                ("step-6", "Monitor Performance", "Track key metrics"),
                ("step-7", "A/B Testing", "Test variations and optimize"),
                ("step-8", "Generate Report", "Compile campaign results"),
            ],
        ),
        workflow(
            "customer-support",
            "Customer Support Flow",
            "Ticket resolution and customer satisfaction process",
            &[
                ("step-1", "Ticket Received", "New support ticket created"),
                ("step-2", "Ticket Triage", "Categorize and prioritize ticket"),
                ("step-3", "Initial Response", "Acknowledge customer inquiry"),
                ("step-4", "Investigation", "Research and analyze issue"),
                ("step-5", "Solution Development", "Create fix or workaround"),
                ("step-6", "Customer Contact", "Provide solution to customer"),
                ("step-7", "Resolution Confirmation", "Verify issue is resolved"),
                ("step-8", "Follow-up Survey", "Send satisfaction survey"),
            ],
        ),
    ]
});

/// The built-in workflow templates, in catalog order
pub fn builtin_workflows() -> &'static [WorkflowDefinition] {
    &BUILTIN
}

/// Look up a built-in workflow by id
pub fn find_builtin(id: &str) -> Option<&'static WorkflowDefinition> {
    BUILTIN.iter().find(|w| w.id == id)
}
