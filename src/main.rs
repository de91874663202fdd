use std::io;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use tui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use fastfix_console::api::{ApiClient, ApiError, Resource, Session};
use fastfix_console::billing::{MonthKey, SearchHit};
use fastfix_console::config;
use fastfix_console::print::{DocumentPrinter, PrintedDocument, ShopHeader};
use fastfix_console::telemetry;
use fastfix_console::ui::{
    account::{AccountAction, AccountState, handle_input as handle_account_input, render_account},
    components::popup::{Alert, render_alert},
    dashboard::{DashboardAction, DashboardState, Section, handle_input as handle_dashboard_input, render_dashboard},
    employee_wizard::{EmployeeWizardAction, EmployeeWizardState, handle_input as handle_employee_wizard_input, render_employee_wizard},
    employees::{EmployeeAction, EmployeesState, handle_input as handle_employees_input, render_employees},
    expense_wizard::{ExpenseWizardAction, ExpenseWizardState, handle_input as handle_expense_wizard_input, render_expense_wizard},
    expenses::{ExpenseAction, ExpensesState, handle_input as handle_expenses_input, render_expenses},
    login::{LoginAction, LoginState, handle_input as handle_login_input, render_login},
    part_order_wizard::{PartOrderWizardAction, PartOrderWizardState, handle_input as handle_part_order_wizard_input, render_part_order_wizard},
    part_orders::{PartOrderAction, PartOrdersState, handle_input as handle_part_orders_input, render_part_orders},
    vehicle_wizard::{VehicleWizardAction, VehicleWizardState, handle_input as handle_vehicle_wizard_input, render_vehicle_wizard},
    vehicles::{VehicleAction, VehiclesState, handle_input as handle_vehicles_input, render_vehicles},
};

// Represents the current screen in the app
enum AppScreen {
    Login,
    Dashboard,
    Vehicles,
    VehicleWizard,
    Expenses,
    ExpenseWizard,
    Employees,
    EmployeeWizard,
    PartOrders,
    PartOrderWizard,
    Account,
}

// Main application state
struct AppState {
    client: ApiClient,
    session: Session,
    printer: DocumentPrinter,
    screen: AppScreen,
    // Month shared by the dashboard and the month-filtered lists
    month: MonthKey,
    alert: Option<Alert>,
    login_state: Option<LoginState>,
    dashboard_state: Option<DashboardState>,
    vehicles_state: Option<VehiclesState>,
    vehicle_wizard_state: Option<VehicleWizardState>,
    expenses_state: Option<ExpensesState>,
    expense_wizard_state: Option<ExpenseWizardState>,
    employees_state: Option<EmployeesState>,
    employee_wizard_state: Option<EmployeeWizardState>,
    part_orders_state: Option<PartOrdersState>,
    part_order_wizard_state: Option<PartOrderWizardState>,
    account_state: Option<AccountState>,
}

impl AppState {
    fn new(client: ApiClient, printer: DocumentPrinter) -> Self {
        Self {
            client,
            session: Session::anonymous(),
            printer,
            screen: AppScreen::Login,
            month: MonthKey::current(),
            alert: None,
            login_state: Some(LoginState::new()),
            dashboard_state: None,
            vehicles_state: None,
            vehicle_wizard_state: None,
            expenses_state: None,
            expense_wizard_state: None,
            employees_state: None,
            employee_wizard_state: None,
            part_orders_state: None,
            part_order_wizard_state: None,
            account_state: None,
        }
    }

    fn username(&self) -> String {
        self.session.username().unwrap_or_default().to_string()
    }

    /// Log a failed call and raise it as a blocking alert.
    fn fail(&mut self, context: &str, err: ApiError) {
        tracing::error!(error = %err, "{} failed", context);
        self.alert = Some(Alert::error(err.user_message()));
    }

    fn not_found(&mut self, resource: Resource) {
        tracing::warn!(resource = resource.path(), "record not found");
        self.alert = Some(Alert::info(
            "Not found",
            format!("{} not found. It may have been deleted.", resource.noun()),
        ));
    }

    fn printed(&mut self, result: Result<PrintedDocument>) {
        self.alert = Some(match result {
            Ok(document) => {
                let path = document.pdf.unwrap_or(document.html);
                Alert::info("Printed", format!("Saved to {}", path.display()))
            }
            Err(err) => {
                tracing::error!(error = %err, "print failed");
                Alert::error(format!("Printing failed: {}", err))
            }
        });
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = config::init()?;
    telemetry::init(&config.log_file)?;
    tracing::info!(api = config.api_base_url(), "starting FastFix console");

    let client = ApiClient::new(config.api_base_url(), config.request_timeout())?;
    let printer = DocumentPrinter::new(&config.print_dir, ShopHeader::from(&config))?;

    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app_state = AppState::new(client, printer);

    // Run the main app loop
    let result = run_app(&mut terminal, &mut app_state).await;

    // Restore terminal
    terminal::disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        tracing::error!(error = %err, "console stopped");
        println!("Error: {}", err);
    }

    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app_state: &mut AppState) -> Result<()> {
    loop {
        terminal.draw(|f| {
            match app_state.screen {
                AppScreen::Login => {
                    if let Some(state) = &mut app_state.login_state {
                        render_login(f, state);
                    }
                }
                AppScreen::Dashboard => {
                    if let Some(state) = &mut app_state.dashboard_state {
                        render_dashboard(f, state);
                    }
                }
                AppScreen::Vehicles => {
                    if let Some(state) = &mut app_state.vehicles_state {
                        render_vehicles(f, state);
                    }
                }
                AppScreen::VehicleWizard => {
                    if let Some(state) = &mut app_state.vehicle_wizard_state {
                        render_vehicle_wizard(f, state);
                    }
                }
                AppScreen::Expenses => {
                    if let Some(state) = &mut app_state.expenses_state {
                        render_expenses(f, state);
                    }
                }
                AppScreen::ExpenseWizard => {
                    if let Some(state) = &mut app_state.expense_wizard_state {
                        render_expense_wizard(f, state);
                    }
                }
                AppScreen::Employees => {
                    if let Some(state) = &mut app_state.employees_state {
                        render_employees(f, state);
                    }
                }
                AppScreen::EmployeeWizard => {
                    if let Some(state) = &mut app_state.employee_wizard_state {
                        render_employee_wizard(f, state);
                    }
                }
                AppScreen::PartOrders => {
                    if let Some(state) = &mut app_state.part_orders_state {
                        render_part_orders(f, state);
                    }
                }
                AppScreen::PartOrderWizard => {
                    if let Some(state) = &mut app_state.part_order_wizard_state {
                        render_part_order_wizard(f, state);
                    }
                }
                AppScreen::Account => {
                    if let Some(state) = &mut app_state.account_state {
                        render_account(f, state);
                    }
                }
            }

            if let Some(alert) = &app_state.alert {
                render_alert(f, alert);
            }
        })?;

        // An open alert swallows the next key
        if app_state.alert.is_some() {
            if let Event::Key(_) = event::read()? {
                app_state.alert = None;
            }
            continue;
        }

        let should_quit = match app_state.screen {
            AppScreen::Login => handle_login_screen(app_state).await?,
            AppScreen::Dashboard => handle_dashboard_screen(app_state).await?,
            AppScreen::Vehicles => handle_vehicles_screen(app_state).await?,
            AppScreen::VehicleWizard => handle_vehicle_wizard_screen(app_state).await?,
            AppScreen::Expenses => handle_expenses_screen(app_state).await?,
            AppScreen::ExpenseWizard => handle_expense_wizard_screen(app_state).await?,
            AppScreen::Employees => handle_employees_screen(app_state).await?,
            AppScreen::EmployeeWizard => handle_employee_wizard_screen(app_state).await?,
            AppScreen::PartOrders => handle_part_orders_screen(app_state).await?,
            AppScreen::PartOrderWizard => handle_part_order_wizard_screen(app_state).await?,
            AppScreen::Account => handle_account_screen(app_state).await?,
        };

        if should_quit {
            break;
        }
    }

    Ok(())
}

async fn load_dashboard_screen(app_state: &mut AppState) {
    match app_state.client.load_workshop(&app_state.session).await {
        Ok(workshop) => {
            let username = app_state.username();
            app_state.dashboard_state = Some(DashboardState::with_month(&username, workshop, app_state.month));
            app_state.screen = AppScreen::Dashboard;
        }
        Err(err) => app_state.fail("Loading dashboard", err),
    }
}

async fn load_vehicles_screen(app_state: &mut AppState) {
    match app_state.client.list_vehicles(&app_state.session).await {
        Ok(vehicles) => {
            app_state.vehicles_state = Some(VehiclesState::new(vehicles, app_state.month));
            app_state.screen = AppScreen::Vehicles;
        }
        Err(err) => app_state.fail("Loading vehicles", err),
    }
}

async fn load_expenses_screen(app_state: &mut AppState) {
    match app_state.client.list_expenses(&app_state.session).await {
        Ok(expenses) => {
            app_state.expenses_state = Some(ExpensesState::new(expenses, app_state.month));
            app_state.screen = AppScreen::Expenses;
        }
        Err(err) => app_state.fail("Loading expenses", err),
    }
}

async fn load_employees_screen(app_state: &mut AppState) {
    match app_state.client.list_employees(&app_state.session).await {
        Ok(employees) => {
            app_state.employees_state = Some(EmployeesState::new(employees));
            app_state.screen = AppScreen::Employees;
        }
        Err(err) => app_state.fail("Loading employees", err),
    }
}

async fn load_part_orders_screen(app_state: &mut AppState) {
    match app_state.client.list_part_orders(&app_state.session).await {
        Ok(orders) => {
            app_state.part_orders_state = Some(PartOrdersState::new(orders, app_state.month));
            app_state.screen = AppScreen::PartOrders;
        }
        Err(err) => app_state.fail("Loading part orders", err),
    }
}

async fn load_account_screen(app_state: &mut AppState) {
    match app_state.client.list_users(&app_state.session).await {
        Ok(users) => {
            let username = app_state.username();
            app_state.account_state = Some(AccountState::new(&username, users));
            app_state.screen = AppScreen::Account;
        }
        Err(err) => app_state.fail("Loading users", err),
    }
}

async fn open_vehicle(app_state: &mut AppState, id: &str) {
    match app_state.client.get_vehicle(&app_state.session, id).await {
        Ok(vehicle) => {
            app_state.vehicle_wizard_state = Some(VehicleWizardState::from_existing(vehicle));
            app_state.screen = AppScreen::VehicleWizard;
        }
        Err(err) if err.is_not_found() => app_state.not_found(Resource::Vehicles),
        Err(err) => app_state.fail("Loading vehicle", err),
    }
}

async fn open_employee(app_state: &mut AppState, id: &str) {
    match app_state.client.get_employee(&app_state.session, id).await {
        Ok(employee) => {
            app_state.employee_wizard_state = Some(EmployeeWizardState::from_existing(employee));
            app_state.screen = AppScreen::EmployeeWizard;
        }
        Err(err) if err.is_not_found() => app_state.not_found(Resource::Employees),
        Err(err) => app_state.fail("Loading employee", err),
    }
}

async fn open_part_order(app_state: &mut AppState, id: &str) {
    match app_state.client.get_part_order(&app_state.session, id).await {
        Ok(order) => {
            app_state.part_order_wizard_state = Some(PartOrderWizardState::from_existing(order));
            app_state.screen = AppScreen::PartOrderWizard;
        }
        Err(err) if err.is_not_found() => app_state.not_found(Resource::PartOrders),
        Err(err) => app_state.fail("Loading part order", err),
    }
}

/// Delete in one batch and report which ids went and which did not.
async fn delete_records(app_state: &mut AppState, resource: Resource, ids: &[String]) -> Vec<String> {
    let outcome = app_state
        .client
        .delete_many(&app_state.session, resource, ids)
        .await;
    let message = outcome.describe(resource);
    app_state.alert = Some(if outcome.is_complete() {
        Alert::info("Deleted", message)
    } else {
        Alert::error(message)
    });
    outcome.deleted
}

async fn handle_login_screen(app_state: &mut AppState) -> Result<bool> {
    let action = match &mut app_state.login_state {
        Some(state) => handle_login_input(state)?,
        None => return Ok(false),
    };

    match action {
        Some(LoginAction::Quit) => return Ok(true),
        Some(LoginAction::Submit(credentials)) => {
            match app_state.client.login(&credentials).await {
                Ok((session, message)) => {
                    app_state.session = session;
                    load_dashboard_screen(app_state).await;
                    if let AppScreen::Dashboard = app_state.screen {
                        app_state.login_state = None;
                        if !message.is_empty() {
                            app_state.alert = Some(Alert::info("Welcome", message));
                        }
                    }
                }
                Err(err) => {
                    tracing::warn!(username = %credentials.username, error = %err, "login failed");
                    if let Some(state) = &mut app_state.login_state {
                        state.set_message(err.user_message());
                    }
                }
            }
        }
        None => {}
    }

    Ok(false)
}

async fn handle_dashboard_screen(app_state: &mut AppState) -> Result<bool> {
    let action = match &mut app_state.dashboard_state {
        Some(state) => {
            let action = handle_dashboard_input(state)?;
            app_state.month = state.month();
            action
        }
        None => return Ok(false),
    };

    match action {
        Some(DashboardAction::Quit) => return Ok(true),
        Some(DashboardAction::Logout) => {
            let username = app_state.username();
            app_state.session.clear();
            app_state.dashboard_state = None;
            app_state.login_state = Some(LoginState::new());
            app_state.screen = AppScreen::Login;
            tracing::info!(%username, "logged out");
        }
        Some(DashboardAction::Refresh) => load_dashboard_screen(app_state).await,
        Some(DashboardAction::Navigate(section)) => match section {
            Section::Vehicles => load_vehicles_screen(app_state).await,
            Section::Expenses => load_expenses_screen(app_state).await,
            Section::Employees => load_employees_screen(app_state).await,
            Section::PartOrders => load_part_orders_screen(app_state).await,
            Section::Account => load_account_screen(app_state).await,
        },
        Some(DashboardAction::Open(hit)) => match hit {
            SearchHit::Vehicle(vehicle) => open_vehicle(app_state, &vehicle.id).await,
            SearchHit::Employee(employee) => open_employee(app_state, &employee.id).await,
            SearchHit::Order(order) => open_part_order(app_state, &order.id).await,
            SearchHit::Expense(expense) => {
                app_state.expense_wizard_state = Some(ExpenseWizardState::from_existing(expense));
                app_state.screen = AppScreen::ExpenseWizard;
            }
        },
        None => {}
    }

    Ok(false)
}

async fn handle_vehicles_screen(app_state: &mut AppState) -> Result<bool> {
    let action = match &mut app_state.vehicles_state {
        Some(state) => {
            let action = handle_vehicles_input(state)?;
            app_state.month = state.month();
            action
        }
        None => return Ok(false),
    };

    match action {
        Some(VehicleAction::Back) => load_dashboard_screen(app_state).await,
        Some(VehicleAction::New) => {
            app_state.vehicle_wizard_state = Some(VehicleWizardState::new());
            app_state.screen = AppScreen::VehicleWizard;
        }
        Some(VehicleAction::Edit(id)) => open_vehicle(app_state, &id).await,
        Some(VehicleAction::Delete(ids)) => {
            let deleted = delete_records(app_state, Resource::Vehicles, &ids).await;
            if let Some(state) = &mut app_state.vehicles_state {
                state.remove(&deleted);
            }
        }
        Some(VehicleAction::Print(vehicle, mode)) => {
            let result = app_state.printer.print_vehicle(&vehicle, mode);
            app_state.printed(result);
        }
        None => {}
    }

    Ok(false)
}

async fn handle_vehicle_wizard_screen(app_state: &mut AppState) -> Result<bool> {
    let action = match &mut app_state.vehicle_wizard_state {
        Some(state) => handle_vehicle_wizard_input(state)?,
        None => return Ok(false),
    };

    match action {
        Some(VehicleWizardAction::Cancel) => {
            app_state.vehicle_wizard_state = None;
            load_vehicles_screen(app_state).await;
        }
        Some(VehicleWizardAction::Save(vehicle)) => {
            let result = if vehicle.id.is_empty() {
                app_state.client.create_vehicle(&app_state.session, &vehicle).await
            } else {
                app_state.client.update_vehicle(&app_state.session, &vehicle).await
            };
            match result {
                Ok(()) => {
                    app_state.vehicle_wizard_state = None;
                    load_vehicles_screen(app_state).await;
                }
                Err(err) => app_state.fail("Saving vehicle", err),
            }
        }
        None => {}
    }

    Ok(false)
}

async fn handle_expenses_screen(app_state: &mut AppState) -> Result<bool> {
    let action = match &mut app_state.expenses_state {
        Some(state) => {
            let action = handle_expenses_input(state)?;
            app_state.month = state.month();
            action
        }
        None => return Ok(false),
    };

    match action {
        Some(ExpenseAction::Back) => load_dashboard_screen(app_state).await,
        Some(ExpenseAction::New) => {
            app_state.expense_wizard_state = Some(ExpenseWizardState::new());
            app_state.screen = AppScreen::ExpenseWizard;
        }
        Some(ExpenseAction::Edit(expense)) => {
            app_state.expense_wizard_state = Some(ExpenseWizardState::from_existing(expense));
            app_state.screen = AppScreen::ExpenseWizard;
        }
        Some(ExpenseAction::Delete(ids)) => {
            let deleted = delete_records(app_state, Resource::Expenses, &ids).await;
            if let Some(state) = &mut app_state.expenses_state {
                state.remove(&deleted);
            }
        }
        None => {}
    }

    Ok(false)
}

async fn handle_expense_wizard_screen(app_state: &mut AppState) -> Result<bool> {
    let action = match &mut app_state.expense_wizard_state {
        Some(state) => handle_expense_wizard_input(state)?,
        None => return Ok(false),
    };

    match action {
        Some(ExpenseWizardAction::Cancel) => {
            app_state.expense_wizard_state = None;
            load_expenses_screen(app_state).await;
        }
        Some(ExpenseWizardAction::Save(expense)) => {
            let result = if expense.id.is_empty() {
                app_state.client.create_expense(&app_state.session, &expense).await
            } else {
                app_state.client.update_expense(&app_state.session, &expense).await
            };
            match result {
                Ok(()) => {
                    app_state.expense_wizard_state = None;
                    load_expenses_screen(app_state).await;
                }
                Err(err) => app_state.fail("Saving expense", err),
            }
        }
        None => {}
    }

    Ok(false)
}

async fn handle_employees_screen(app_state: &mut AppState) -> Result<bool> {
    let action = match &mut app_state.employees_state {
        Some(state) => handle_employees_input(state)?,
        None => return Ok(false),
    };

    match action {
        Some(EmployeeAction::Back) => load_dashboard_screen(app_state).await,
        Some(EmployeeAction::New) => {
            app_state.employee_wizard_state = Some(EmployeeWizardState::new());
            app_state.screen = AppScreen::EmployeeWizard;
        }
        Some(EmployeeAction::Edit(id)) => open_employee(app_state, &id).await,
        Some(EmployeeAction::Delete(ids)) => {
            let deleted = delete_records(app_state, Resource::Employees, &ids).await;
            if let Some(state) = &mut app_state.employees_state {
                state.remove(&deleted);
            }
        }
        None => {}
    }

    Ok(false)
}

async fn handle_employee_wizard_screen(app_state: &mut AppState) -> Result<bool> {
    let action = match &mut app_state.employee_wizard_state {
        Some(state) => handle_employee_wizard_input(state)?,
        None => return Ok(false),
    };

    match action {
        Some(EmployeeWizardAction::Cancel) => {
            app_state.employee_wizard_state = None;
            load_employees_screen(app_state).await;
        }
        Some(EmployeeWizardAction::Save(employee)) => {
            let result = if employee.id.is_empty() {
                app_state.client.create_employee(&app_state.session, &employee).await
            } else {
                app_state.client.update_employee(&app_state.session, &employee).await
            };
            match result {
                Ok(()) => {
                    app_state.employee_wizard_state = None;
                    load_employees_screen(app_state).await;
                }
                Err(err) => app_state.fail("Saving employee", err),
            }
        }
        None => {}
    }

    Ok(false)
}

async fn handle_part_orders_screen(app_state: &mut AppState) -> Result<bool> {
    let action = match &mut app_state.part_orders_state {
        Some(state) => {
            let action = handle_part_orders_input(state)?;
            app_state.month = state.month();
            action
        }
        None => return Ok(false),
    };

    match action {
        Some(PartOrderAction::Back) => load_dashboard_screen(app_state).await,
        Some(PartOrderAction::New) => {
            app_state.part_order_wizard_state = Some(PartOrderWizardState::new());
            app_state.screen = AppScreen::PartOrderWizard;
        }
        Some(PartOrderAction::Edit(id)) => open_part_order(app_state, &id).await,
        Some(PartOrderAction::Delete(ids)) => {
            let deleted = delete_records(app_state, Resource::PartOrders, &ids).await;
            if let Some(state) = &mut app_state.part_orders_state {
                state.remove(&deleted);
            }
        }
        Some(PartOrderAction::Print(order, mode)) => {
            let result = app_state.printer.print_part_order(&order, mode);
            app_state.printed(result);
        }
        Some(PartOrderAction::Share(link)) => {
            tracing::info!(%link, "shared part order");
            app_state.alert = Some(Alert::info("Send on WhatsApp", link));
        }
        None => {}
    }

    Ok(false)
}

async fn handle_part_order_wizard_screen(app_state: &mut AppState) -> Result<bool> {
    let action = match &mut app_state.part_order_wizard_state {
        Some(state) => handle_part_order_wizard_input(state)?,
        None => return Ok(false),
    };

    match action {
        Some(PartOrderWizardAction::Cancel) => {
            app_state.part_order_wizard_state = None;
            load_part_orders_screen(app_state).await;
        }
        Some(PartOrderWizardAction::Save(order)) => {
            let result = if order.id.is_empty() {
                app_state.client.create_part_order(&app_state.session, &order).await
            } else {
                app_state.client.update_part_order(&app_state.session, &order).await
            };
            match result {
                Ok(()) => {
                    app_state.part_order_wizard_state = None;
                    load_part_orders_screen(app_state).await;
                }
                Err(err) => app_state.fail("Saving part order", err),
            }
        }
        None => {}
    }

    Ok(false)
}

async fn handle_account_screen(app_state: &mut AppState) -> Result<bool> {
    let action = match &mut app_state.account_state {
        Some(state) => handle_account_input(state)?,
        None => return Ok(false),
    };

    match action {
        Some(AccountAction::Back) => load_dashboard_screen(app_state).await,
        Some(AccountAction::Register(registration)) => {
            let result = match app_state.client.register(&registration).await {
                Ok(()) => app_state.client.list_users(&app_state.session).await,
                Err(err) => Err(err),
            };
            if let Some(state) = &mut app_state.account_state {
                match result {
                    Ok(users) => state.registered(users, format!("Registered {}", registration.username)),
                    Err(err) => {
                        tracing::error!(error = %err, "registration failed");
                        state.set_error(err.user_message());
                    }
                }
            }
        }
        None => {}
    }

    Ok(false)
}
